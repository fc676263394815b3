pub mod campaigns;
pub mod editor;
pub mod system;
