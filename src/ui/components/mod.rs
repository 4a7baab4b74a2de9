pub mod chat_area;
pub mod header;
pub mod image_preview;
pub mod input_bar;
pub mod medication_card;
pub mod thumbnail;
