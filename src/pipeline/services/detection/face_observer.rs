use super::{best_class, ExpressionClassifier, FaceLocator};
use crate::common::Frame;
use crate::config::ClassifierSettings;
use crate::error::ClassifierError;
use crate::pipeline::types::{BoundingBox, FaceObservation, LabelUniverse};
use image::imageops::{self, FilterType};
use image::RgbImage;
use tracing::{debug, warn};

/// Runs the locator and classifier for one frame and turns raw scores into
/// labelled observations. Anything that goes wrong for a single face drops
/// that face instead of failing the tick.
pub struct FaceObserver<'a> {
    locator: &'a dyn FaceLocator,
    classifier: &'a dyn ExpressionClassifier,
    universe: &'a LabelUniverse,
    settings: &'a ClassifierSettings,
}

impl<'a> FaceObserver<'a> {
    pub fn new(
        locator: &'a dyn FaceLocator,
        classifier: &'a dyn ExpressionClassifier,
        universe: &'a LabelUniverse,
        settings: &'a ClassifierSettings,
    ) -> Self {
        Self {
            locator,
            classifier,
            universe,
            settings,
        }
    }

    pub fn locate(&self, frame: &Frame) -> Vec<BoundingBox> {
        self.locator.locate(frame)
    }

    /// Classifies each box in locator order. The result keeps that order.
    pub fn classify_all(&self, frame: &Frame, boxes: &[BoundingBox]) -> Vec<FaceObservation> {
        boxes
            .iter()
            .filter_map(|bounds| self.classify_face(frame, bounds))
            .collect()
    }

    fn classify_face(&self, frame: &Frame, bounds: &BoundingBox) -> Option<FaceObservation> {
        let crop = crop_face(frame.image(), bounds, self.settings.crop_size)?;

        let scores = match self.classifier.classify(&crop) {
            Ok(scores) => scores,
            Err(e) => {
                warn!("Classifier failed for face at {:?}: {}", bounds, e);
                return None;
            }
        };
        if scores.len() != self.universe.len() {
            let err = ClassifierError::OutputSize {
                expected: self.universe.len(),
                found: scores.len(),
            };
            warn!("Dropping face at {:?}: {}", bounds, err);
            return None;
        }

        let (index, confidence) = best_class(&scores)?;
        if let Some(min) = self.settings.min_confidence {
            if confidence < min {
                debug!("Dropping low confidence prediction ({:.2} < {:.2})", confidence, min);
                return None;
            }
        }

        let label = self.universe.get(index)?.clone();
        Some(FaceObservation::new(*bounds, label).with_confidence(confidence))
    }
}

/// Cuts the face out of the frame (clamped to the frame) and resizes it to a
/// `size` x `size` square.
pub fn crop_face(frame: &RgbImage, bounds: &BoundingBox, size: u32) -> Option<RgbImage> {
    let visible = bounds.clamp_to(frame.width(), frame.height())?;
    let crop = imageops::crop_imm(frame, visible.x, visible.y, visible.width, visible.height)
        .to_image();
    Some(imageops::resize(&crop, size, size, FilterType::Triangle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    struct FixedLocator(Vec<BoundingBox>);

    impl FaceLocator for FixedLocator {
        fn locate(&self, _frame: &Frame) -> Vec<BoundingBox> {
            self.0.clone()
        }
    }

    /// Predicts class 0 for dark crops and class 1 for bright ones.
    struct BrightnessClassifier;

    impl ExpressionClassifier for BrightnessClassifier {
        fn output_size(&self) -> usize {
            2
        }

        fn classify(&self, crop: &RgbImage) -> Result<Vec<f32>, ClassifierError> {
            assert_eq!(crop.dimensions(), (16, 16));
            let bright = crop.get_pixel(8, 8).0[0] > 127;
            Ok(if bright { vec![0.2, 0.8] } else { vec![0.9, 0.1] })
        }
    }

    struct FailingClassifier;

    impl ExpressionClassifier for FailingClassifier {
        fn output_size(&self) -> usize {
            2
        }

        fn classify(&self, _crop: &RgbImage) -> Result<Vec<f32>, ClassifierError> {
            Err(ClassifierError::Inference("model not loaded".into()))
        }
    }

    fn frame() -> Frame {
        let mut image = RgbImage::from_pixel(100, 50, Rgb([0, 0, 0]));
        for y in 0..50 {
            for x in 50..100 {
                image.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        Frame::capture(image)
    }

    fn settings() -> ClassifierSettings {
        ClassifierSettings {
            crop_size: 16,
            min_confidence: None,
        }
    }

    #[test]
    fn maps_best_score_through_universe_in_locator_order() {
        let universe = LabelUniverse::from_labels(["neutral", "happy"]).unwrap();
        let locator = FixedLocator(vec![
            BoundingBox::new(60, 10, 20, 20),
            BoundingBox::new(10, 10, 20, 20),
        ]);
        let settings = settings();
        let observer = FaceObserver::new(&locator, &BrightnessClassifier, &universe, &settings);

        let frame = frame();
        let boxes = observer.locate(&frame);
        let observations = observer.classify_all(&frame, &boxes);

        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].label.as_str(), "happy");
        assert_eq!(observations[0].confidence, Some(0.8));
        assert_eq!(observations[1].label.as_str(), "neutral");
    }

    #[test]
    fn classifier_failure_drops_the_face() {
        let universe = LabelUniverse::from_labels(["neutral", "happy"]).unwrap();
        let locator = FixedLocator(vec![BoundingBox::new(10, 10, 20, 20)]);
        let settings = settings();
        let observer = FaceObserver::new(&locator, &FailingClassifier, &universe, &settings);

        let frame = frame();
        let boxes = observer.locate(&frame);
        assert!(observer.classify_all(&frame, &boxes).is_empty());
    }

    #[test]
    fn low_confidence_prediction_is_dropped() {
        let universe = LabelUniverse::from_labels(["neutral", "happy"]).unwrap();
        let locator = FixedLocator(vec![BoundingBox::new(60, 10, 20, 20)]);
        let settings = ClassifierSettings {
            crop_size: 16,
            min_confidence: Some(0.85),
        };
        let observer = FaceObserver::new(&locator, &BrightnessClassifier, &universe, &settings);

        let frame = frame();
        let boxes = observer.locate(&frame);
        assert!(observer.classify_all(&frame, &boxes).is_empty());
    }

    #[test]
    fn box_outside_frame_is_skipped() {
        let image = RgbImage::new(10, 10);
        assert!(crop_face(&image, &BoundingBox::new(20, 20, 5, 5), 8).is_none());
        let crop = crop_face(&image, &BoundingBox::new(5, 5, 20, 20), 8).unwrap();
        assert_eq!(crop.dimensions(), (8, 8));
    }
}
