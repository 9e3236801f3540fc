use crate::pipeline::types::{BoundingBox, FaceObservation, Label};

/// Box color for a face: affirmative when its label is the round's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationColor {
    Affirmative,
    Contrary,
}

impl AnnotationColor {
    pub fn rgb(&self) -> [u8; 3] {
        match self {
            AnnotationColor::Affirmative => [0, 255, 0],
            AnnotationColor::Contrary => [255, 0, 0],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaceAnnotation {
    pub bounds: BoundingBox,
    pub label: Label,
    pub color: AnnotationColor,
}

impl FaceAnnotation {
    pub fn matches_target(&self) -> bool {
        self.color == AnnotationColor::Affirmative
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchEvaluation {
    pub annotations: Vec<FaceAnnotation>,
    /// Index into `annotations` of the first face that matched, in evaluation order.
    pub first_match: Option<usize>,
    /// True only when the round had no match yet and a face matched this tick.
    pub new_match: bool,
}

/// Decides per-face colors and whether this tick produced the round's first match.
/// Stateless: whether the round is already matched is passed in by the caller.
pub struct MatchEvaluator;

impl MatchEvaluator {
    pub fn evaluate(
        target: &Label,
        observations: &[FaceObservation],
        already_matched: bool,
    ) -> MatchEvaluation {
        let annotations: Vec<FaceAnnotation> = observations
            .iter()
            .map(|observation| FaceAnnotation {
                bounds: observation.bounds,
                label: observation.label.clone(),
                color: if &observation.label == target {
                    AnnotationColor::Affirmative
                } else {
                    AnnotationColor::Contrary
                },
            })
            .collect();

        let first_match = annotations.iter().position(FaceAnnotation::matches_target);

        MatchEvaluation {
            new_match: !already_matched && first_match.is_some(),
            first_match,
            annotations,
        }
    }
}
