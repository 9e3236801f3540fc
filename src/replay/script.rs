use crate::common::Frame;
use crate::error::{ClassifierError, ReplayError};
use crate::pipeline::services::detection::{ExpressionClassifier, FaceLocator};
use crate::pipeline::types::BoundingBox;
use image::RgbImage;
use serde::Deserialize;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Pre-recorded detector and classifier output, one entry per tick.
///
/// ```json
/// {
///   "output_labels": ["angry", "happy", "sad"],
///   "ticks": [
///     {"faces": []},
///     {"faces": [{"x": 200, "y": 120, "width": 160, "height": 160, "label": "happy"}]}
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayScript {
    pub output_labels: Vec<String>,
    #[serde(default)]
    pub ticks: Vec<ScriptedTick>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptedTick {
    #[serde(default)]
    pub faces: Vec<ScriptedFace>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptedFace {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub label: String,
    pub confidence: Option<f32>,
}

impl ScriptedFace {
    fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.width, self.height)
    }
}

impl ReplayScript {
    pub fn from_file(path: &Path) -> Result<Self, ReplayError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ReplayError::ReadScript(path.to_path_buf(), e))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ReplayError> {
        let script: Self = serde_json::from_str(contents)?;
        script.validate()?;
        Ok(script)
    }

    /// Every scripted confidence must keep its label the best score: above
    /// `1 / output_labels.len()` and at most 1.
    pub fn validate(&self) -> Result<(), ReplayError> {
        let classes = self.output_labels.len().max(1) as f32;
        let floor = 1.0 / classes;
        for (tick, entry) in self.ticks.iter().enumerate() {
            for face in &entry.faces {
                let Some(confidence) = face.confidence else {
                    continue;
                };
                let valid = confidence <= 1.0 && (confidence > floor || classes == 1.0);
                if !(valid && confidence > 0.0) {
                    return Err(ReplayError::InvalidConfidence {
                        tick,
                        label: face.label.clone(),
                        confidence,
                        floor,
                    });
                }
            }
        }
        Ok(())
    }

    /// A script with no ticks: no faces are ever seen.
    pub fn empty(output_labels: Vec<String>) -> Self {
        Self {
            output_labels,
            ticks: Vec::new(),
        }
    }

    /// Splits the script into a locator and a classifier that stay in step:
    /// each `locate` call queues that tick's faces for the following
    /// `classify` calls.
    pub fn into_collaborators(self) -> (ScriptedLocator, ScriptedClassifier) {
        let pending = Arc::new(Mutex::new(VecDeque::new()));
        let locator = ScriptedLocator {
            ticks: Mutex::new(self.ticks.into()),
            pending: pending.clone(),
        };
        let classifier = ScriptedClassifier {
            output_labels: self.output_labels,
            pending,
        };
        (locator, classifier)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct ScriptedLocator {
    ticks: Mutex<VecDeque<ScriptedTick>>,
    pending: Arc<Mutex<VecDeque<ScriptedFace>>>,
}

impl ScriptedLocator {
    pub fn remaining_ticks(&self) -> usize {
        lock(&self.ticks).len()
    }
}

impl FaceLocator for ScriptedLocator {
    /// Faces lying wholly outside the frame are left out. They would never be
    /// cropped, so queueing them would shift every later face onto the wrong
    /// scripted label.
    fn locate(&self, frame: &Frame) -> Vec<BoundingBox> {
        let tick = lock(&self.ticks).pop_front().unwrap_or_default();
        let (width, height) = (frame.width(), frame.height());
        let visible: Vec<ScriptedFace> = tick
            .faces
            .into_iter()
            .filter(|face| {
                let on_frame = face.bounds().clamp_to(width, height).is_some();
                if !on_frame {
                    debug!("Scripted face {:?} is outside the frame", face.bounds());
                }
                on_frame
            })
            .collect();

        let boxes = visible.iter().map(ScriptedFace::bounds).collect();
        let mut pending = lock(&self.pending);
        pending.clear();
        pending.extend(visible);
        boxes
    }
}

pub struct ScriptedClassifier {
    output_labels: Vec<String>,
    pending: Arc<Mutex<VecDeque<ScriptedFace>>>,
}

impl ExpressionClassifier for ScriptedClassifier {
    fn output_size(&self) -> usize {
        self.output_labels.len()
    }

    fn output_labels(&self) -> Option<Vec<String>> {
        Some(self.output_labels.clone())
    }

    fn classify(&self, _crop: &RgbImage) -> Result<Vec<f32>, ClassifierError> {
        let face = lock(&self.pending)
            .pop_front()
            .ok_or_else(|| ClassifierError::Inference("no scripted face for this crop".into()))?;
        let index = self
            .output_labels
            .iter()
            .position(|label| label == &face.label)
            .ok_or_else(|| {
                ClassifierError::Inference(format!("unknown scripted label '{}'", face.label))
            })?;

        let confidence = face.confidence.unwrap_or(1.0).clamp(0.0, 1.0);
        let others = if self.output_labels.len() > 1 {
            (1.0 - confidence) / (self.output_labels.len() - 1) as f32
        } else {
            0.0
        };
        let mut scores = vec![others; self.output_labels.len()];
        scores[index] = confidence;
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"{
        "output_labels": ["angry", "happy", "sad"],
        "ticks": [
            {"faces": [{"x": 1, "y": 2, "width": 30, "height": 40, "label": "happy", "confidence": 0.7}]},
            {},
            {"faces": [
                {"x": 0, "y": 0, "width": 10, "height": 10, "label": "sad"},
                {"x": 20, "y": 0, "width": 10, "height": 10, "label": "angry"}
            ]}
        ]
    }"#;

    fn frame() -> Frame {
        Frame::capture(RgbImage::new(64, 64))
    }

    #[test]
    fn replays_ticks_in_order() {
        let (locator, classifier) = ReplayScript::parse(SCRIPT).unwrap().into_collaborators();
        assert_eq!(classifier.output_size(), 3);
        assert_eq!(locator.remaining_ticks(), 3);

        let boxes = locator.locate(&frame());
        assert_eq!(boxes, vec![BoundingBox::new(1, 2, 30, 40)]);
        let scores = classifier.classify(&RgbImage::new(8, 8)).unwrap();
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[1], 0.7);

        assert!(locator.locate(&frame()).is_empty());

        assert_eq!(locator.locate(&frame()).len(), 2);
        assert_eq!(classifier.classify(&RgbImage::new(8, 8)).unwrap()[2], 1.0);
        assert_eq!(classifier.classify(&RgbImage::new(8, 8)).unwrap()[0], 1.0);

        // Exhausted script: no faces, nothing to classify.
        assert!(locator.locate(&frame()).is_empty());
        assert!(classifier.classify(&RgbImage::new(8, 8)).is_err());
    }

    #[test]
    fn leftover_faces_do_not_leak_into_next_tick() {
        let (locator, classifier) = ReplayScript::parse(SCRIPT).unwrap().into_collaborators();
        locator.locate(&frame());
        locator.locate(&frame());
        assert!(classifier.classify(&RgbImage::new(8, 8)).is_err());
    }

    #[test]
    fn unknown_label_is_a_classifier_error() {
        let script = r#"{"output_labels": ["happy"], "ticks": [{"faces": [{"x": 0, "y": 0, "width": 4, "height": 4, "label": "smug"}]}]}"#;
        let (locator, classifier) = ReplayScript::parse(script).unwrap().into_collaborators();
        locator.locate(&frame());
        assert!(matches!(
            classifier.classify(&RgbImage::new(4, 4)),
            Err(ClassifierError::Inference(_))
        ));
    }

    #[test]
    fn off_frame_face_does_not_shift_labels() {
        let script = r#"{
            "output_labels": ["angry", "happy", "sad"],
            "ticks": [{"faces": [
                {"x": 5000, "y": 10, "width": 50, "height": 50, "label": "angry"},
                {"x": 10, "y": 10, "width": 20, "height": 20, "label": "happy"}
            ]}]
        }"#;
        let (locator, classifier) = ReplayScript::parse(script).unwrap().into_collaborators();

        let boxes = locator.locate(&frame());
        assert_eq!(boxes, vec![BoundingBox::new(10, 10, 20, 20)]);
        let scores = classifier.classify(&RgbImage::new(8, 8)).unwrap();
        assert_eq!(scores[1], 1.0);
        assert!(classifier.classify(&RgbImage::new(8, 8)).is_err());
    }

    #[test]
    fn confidence_that_would_lose_the_argmax_is_rejected() {
        for confidence in ["0.2", "0.3333", "0", "1.5"] {
            let script = format!(
                r#"{{"output_labels": ["angry", "happy", "sad"],
                    "ticks": [{{"faces": [{{"x": 0, "y": 0, "width": 4, "height": 4,
                        "label": "happy", "confidence": {confidence}}}]}}]}}"#
            );
            assert!(
                matches!(
                    ReplayScript::parse(&script),
                    Err(ReplayError::InvalidConfidence { tick: 0, .. })
                ),
                "confidence {confidence}"
            );
        }
    }

    #[test]
    fn lowest_accepted_confidence_still_wins() {
        let script = r#"{"output_labels": ["angry", "happy", "sad"],
            "ticks": [{"faces": [{"x": 0, "y": 0, "width": 4, "height": 4, "label": "sad", "confidence": 0.34}]}]}"#;
        let (locator, classifier) = ReplayScript::parse(script).unwrap().into_collaborators();
        locator.locate(&frame());
        let scores = classifier.classify(&RgbImage::new(4, 4)).unwrap();
        assert_eq!(
            crate::pipeline::services::detection::best_class(&scores).map(|(i, _)| i),
            Some(2)
        );
    }

    #[test]
    fn malformed_script_is_rejected() {
        assert!(matches!(
            ReplayScript::parse("{\"ticks\": []}"),
            Err(ReplayError::ParseScript(_))
        ));
    }
}
