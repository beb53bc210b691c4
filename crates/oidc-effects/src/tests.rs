//! Router tests against a scripted identity library.

mod helpers;
