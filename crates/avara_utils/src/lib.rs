//! Various utilities shared by the level tools

pub mod color;
pub mod fixed;
pub mod mac_roman;

mod id;
pub use id::{EntityId, IdAllocator};

mod result_ext;
pub use result_ext::AnyhowResultExt;

pub use color::Color;
pub use fixed::Fixed;

pub type AnyResult<T = (), E = anyhow::Error> = anyhow::Result<T, E>;

/// Shorthand for `Ok(())`, cause it looks ugly
pub const fn ok<E>() -> Result<(), E> {
    Ok(())
}

/// Generates a match statement that verifies a discriminant value as a single "expression".
///
/// ## Example
/// ```
/// # use avara_utils::discriminant_matches;
/// enum Example { Simple, Tupled(u32) }
///
/// let a = Example::Simple;
/// assert!(discriminant_matches!(a, Example::Simple));
///
/// // Tupled variants must match the parameters. Don't name them to not get warnings.
/// let b = Example::Tupled(123);
/// assert!(discriminant_matches!(b, Example::Tupled(_)));
/// ```
#[macro_export]
macro_rules! discriminant_matches {
    ($value:expr, $discriminant:pat) => {
        match $value {
            $discriminant => true,
            _ => false,
        }
    };
}
