pub mod pools;
pub mod positions;
pub mod setup;
pub mod ui;
