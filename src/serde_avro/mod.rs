mod de;
mod de_impl;
mod ser;
mod ser_impl;

pub(crate) use self::de::SerdeReader;
pub use self::ser::{to_value, SerdeWriter};
