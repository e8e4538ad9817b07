// Record processing: parsing, image resolution and normalization

pub mod images;
pub mod normalize;
pub mod parser;
