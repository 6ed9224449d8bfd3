//! Normalized cross-correlation template matcher.

use image::GrayImage;
use vguard_core::{Frame, TemplateMatcher};
use vguard_models::MatchRect;

/// Exhaustive NCC search over a strided grid.
///
/// Scores every `step`-aligned placement of the template inside the frame
/// and reports the best one when it reaches the threshold. Flat regions
/// (zero variance) never match.
#[derive(Debug, Default, Clone, Copy)]
pub struct GrayTemplateMatcher;

impl GrayTemplateMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Best placement and its score, regardless of threshold.
    pub fn best_match(&self, frame: &GrayImage, template: &GrayImage, step: u32) -> Option<(MatchRect, f32)> {
        let (fw, fh) = frame.dimensions();
        let (tw, th) = template.dimensions();
        if tw == 0 || th == 0 || tw > fw || th > fh {
            return None;
        }

        let stats = TemplateStats::new(template)?;
        let step = step.max(1) as usize;
        let mut best: Option<(u32, u32, f64)> = None;

        for y in (0..=fh - th).step_by(step) {
            for x in (0..=fw - tw).step_by(step) {
                let score = stats.score(frame, template, x, y);
                if best.map_or(true, |(_, _, s)| score > s) {
                    best = Some((x, y, score));
                }
            }
        }

        best.map(|(x, y, score)| {
            (
                MatchRect::new(x as i32, y as i32, tw as i32, th as i32),
                score as f32,
            )
        })
    }
}

impl TemplateMatcher for GrayTemplateMatcher {
    fn find(&self, frame: &Frame, template: &GrayImage, threshold: f32, step: u32) -> Option<MatchRect> {
        self.best_match(&frame.image, template, step)
            .filter(|(_, score)| *score >= threshold)
            .map(|(rect, _)| rect)
    }

    fn name(&self) -> &'static str {
        "ncc"
    }
}

/// Template mean and norm, computed once per search.
struct TemplateStats {
    mean: f64,
    norm: f64,
}

impl TemplateStats {
    fn new(template: &GrayImage) -> Option<Self> {
        let n = f64::from(template.width() * template.height());
        let mean = template.pixels().map(|p| f64::from(p.0[0])).sum::<f64>() / n;
        let norm = template
            .pixels()
            .map(|p| (f64::from(p.0[0]) - mean).powi(2))
            .sum::<f64>()
            .sqrt();

        (norm > f64::EPSILON).then_some(Self { mean, norm })
    }

    fn score(&self, frame: &GrayImage, template: &GrayImage, x: u32, y: u32) -> f64 {
        let (tw, th) = template.dimensions();
        let n = f64::from(tw * th);

        let mut sum = 0.0;
        for ty in 0..th {
            for tx in 0..tw {
                sum += f64::from(frame.get_pixel(x + tx, y + ty).0[0]);
            }
        }
        let patch_mean = sum / n;

        let mut cross = 0.0;
        let mut patch_sq = 0.0;
        for ty in 0..th {
            for tx in 0..tw {
                let p = f64::from(frame.get_pixel(x + tx, y + ty).0[0]) - patch_mean;
                let t = f64::from(template.get_pixel(tx, ty).0[0]) - self.mean;
                cross += p * t;
                patch_sq += p * p;
            }
        }

        let denom = patch_sq.sqrt() * self.norm;
        if denom <= f64::EPSILON {
            return 0.0;
        }
        cross / denom
    }
}
