mod script;

pub use script::{ReplayScript, ScriptedClassifier, ScriptedFace, ScriptedLocator, ScriptedTick};
