//! DOM-query capability consumed by the crawler.
//!
//! The crawler never renders pages itself. It talks to a [`Document`]: a
//! rendered page that can be navigated, scrolled and queried by CSS selector.
//! [`ChromeDocument`] drives headless Chrome over the DevTools protocol;
//! `testing::MockDocument` replays scripted pages.

mod chrome;
mod error;
mod traits;

pub use chrome::ChromeDocument;
pub use error::DomError;
pub use traits::Document;
