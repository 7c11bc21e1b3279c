//! Reference-data helpers shared by the job catalog forms.

mod options;

pub use options::SelectOption;
