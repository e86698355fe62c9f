pub mod area;
pub mod campaign;
pub mod file;
pub mod phase;
pub mod reference;
pub mod theme;
pub mod validation;

pub use area::{Area, AreaInput};
pub use campaign::{Campaign, CampaignInput};
pub use file::{FileInput, StoredFile};
pub use phase::{Phase, PhaseInput};
pub use reference::{ReferenceItem, ReferenceList};
pub use theme::{Theme, ThemeInput};
