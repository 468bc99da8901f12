pub mod capacity;
pub mod path;
pub mod ringchannel;
