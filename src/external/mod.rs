pub mod notifications;

pub use notifications::{DynNotifier, HttpNotifier, LogNotifier, Notifier};
