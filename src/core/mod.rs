pub mod checkout;
pub mod courses;
pub mod enrichment;
pub mod generation;
pub mod pipeline;
pub mod prompt;

pub use crate::domain::model::{CourseOutline, CourseOutlineRequest, DifficultyLevel, Lesson, Module};
pub use crate::domain::ports::{CourseStore, PaymentGateway, TextGenerator, VideoSearch};
pub use crate::utils::error::Result;
