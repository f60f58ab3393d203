pub mod principal_extractor;

pub use principal_extractor::Principal;
