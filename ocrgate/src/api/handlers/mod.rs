pub mod health;
pub mod ocr;

pub use health::{health_check, root};
pub use ocr::{extract_text, extract_text_with_prompt};
