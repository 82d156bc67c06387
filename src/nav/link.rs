//! Link activation.

use url::Url;

use crate::markup::Attrs;

/// An activated anchor element, described by its attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anchor {
    attrs: Attrs,
}

impl Anchor {
    pub fn new(attrs: Attrs) -> Self {
        Self { attrs }
    }

    /// `<a href="...">` without the opt-in marker.
    pub fn plain(href: &str) -> Self {
        Self::new(vec![("href".into(), Some(href.into()))])
    }

    /// `<a href="..." marker>`.
    pub fn opted_in(href: &str, marker: &str) -> Self {
        Self::plain(href).with_attr(marker, None)
    }

    pub fn with_attr(mut self, name: &str, value: Option<&str>) -> Self {
        self.attrs.push((name.to_owned(), value.map(str::to_owned)));
        self
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs
            .iter()
            .any(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    pub fn href(&self) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("href"))
            .and_then(|(_, value)| value.as_deref())
    }

    /// Same-origin target of an opted-in anchor, resolved against `location`.
    ///
    /// Anchors without the marker, without a usable `href`, or pointing at
    /// another origin are left to ordinary navigation.
    pub fn soft_target(&self, marker: &str, location: &Url) -> Option<Url> {
        if !self.has_attr(marker) {
            return None;
        }
        let target = location.join(self.href()?).ok()?;
        (target.origin() == location.origin()).then_some(target)
    }
}
