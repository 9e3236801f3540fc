mod match_evaluator;

pub use match_evaluator::{AnnotationColor, FaceAnnotation, MatchEvaluation, MatchEvaluator};
