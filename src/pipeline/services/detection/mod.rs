mod expression_classifier;
mod face_locator;
mod face_observer;

pub use expression_classifier::{best_class, ExpressionClassifier};
pub use face_locator::FaceLocator;
pub use face_observer::{crop_face, FaceObserver};
