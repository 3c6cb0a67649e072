pub mod add;
pub mod cancel;
pub mod r#do;
pub mod list;
pub mod materialize;
pub mod recurrence;
