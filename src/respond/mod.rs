//! Response composition - evidence to natural-language answer
//!
//! The composer walks a fixed decision ladder (greeting, scope, rows,
//! no-data message, context, generic fallback); narrative phrasing is
//! delegated to an injectable `TemplateRenderer` so alternate backends
//! can change wording without touching intent or query logic.

mod composer;
mod mentions;
mod templates;

pub use composer::Composer;
pub use mentions::{extract_mentions, Mentions};
pub use templates::{FixedTemplates, TemplateRenderer};
