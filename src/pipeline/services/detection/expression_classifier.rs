use crate::error::ClassifierError;
use image::RgbImage;

/// Scores a square face crop against every class in the model's output space.
///
/// Score `i` belongs to label `i` of the label universe; the session refuses
/// to start unless `output_size` (and `output_labels`, when available) agree
/// with the universe.
pub trait ExpressionClassifier: Send + Sync {
    fn output_size(&self) -> usize;

    /// Class names in output order, when the model ships them.
    fn output_labels(&self) -> Option<Vec<String>> {
        None
    }

    fn classify(&self, crop: &RgbImage) -> Result<Vec<f32>, ClassifierError>;
}

/// Index and value of the highest score. NaN scores are ignored.
pub fn best_class(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, score)| !score.is_nan())
        .fold(None, |best, (index, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((index, score)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_highest_score() {
        assert_eq!(best_class(&[0.1, 0.7, 0.2]), Some((1, 0.7)));
    }

    #[test]
    fn first_index_wins_ties() {
        assert_eq!(best_class(&[0.5, 0.5]), Some((0, 0.5)));
    }

    #[test]
    fn empty_or_nan_scores_have_no_best() {
        assert_eq!(best_class(&[]), None);
        assert_eq!(best_class(&[f32::NAN, f32::NAN]), None);
        assert_eq!(best_class(&[f32::NAN, 0.3]), Some((1, 0.3)));
    }
}
