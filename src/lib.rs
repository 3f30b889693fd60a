
pub mod numeric;
pub mod interval;
pub mod ray;
pub mod bbox;
pub mod geometry;
pub mod acceleration;
pub mod scene;
pub mod mesh;
pub mod oracle;
pub mod sampler;
pub mod hitbox;
pub mod editor;
pub mod export;
pub mod loader;
pub mod redraw;
pub mod config;
pub mod json_parser;
pub mod error;

pub mod prelude;
