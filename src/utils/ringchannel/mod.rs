mod channel;
mod select;

pub use channel::*;

pub use select::Select;
pub use select::SelectGroup;
pub use select::SelectToken;
pub use select::Selectable;
