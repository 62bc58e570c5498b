//! The assembled dump script.

use std::fmt;
use std::io::{self, Write};

use crate::generator::{Fragment, FragmentKind};

/// A replayable script: preamble, per-entity fragments in emission order,
/// postamble.
///
/// Fragments are kept separately and only joined by [`DumpScript::render`]
/// or [`DumpScript::write_to`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpScript {
    preamble: String,
    fragments: Vec<Fragment>,
    postamble: String,
}

impl DumpScript {
    pub fn new(preamble: String, postamble: String) -> Self {
        Self {
            preamble,
            fragments: Vec::new(),
            postamble,
        }
    }

    /// Append a fragment. Empty fragments are dropped.
    pub(crate) fn push(&mut self, fragment: Fragment) {
        if !fragment.is_empty() {
            self.fragments.push(fragment);
        }
    }

    /// Set the postamble once every fragment is in.
    pub(crate) fn close(&mut self, postamble: String) {
        self.postamble = postamble;
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    pub fn postamble(&self) -> &str {
        &self.postamble
    }

    /// Non-empty fragments in emission order.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Look up the fragment of one entity.
    pub fn fragment(&self, kind: FragmentKind, name: &str) -> Option<&Fragment> {
        self.fragments
            .iter()
            .find(|f| f.kind() == kind && f.name() == name)
    }

    /// Total length of the rendered script in bytes.
    pub fn len(&self) -> usize {
        self.preamble.len()
            + self.fragments.iter().map(|f| f.text().len()).sum::<usize>()
            + self.postamble.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Join everything into one string.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.len());
        out.push_str(&self.preamble);
        for fragment in &self.fragments {
            out.push_str(fragment.text());
        }
        out.push_str(&self.postamble);
        out
    }

    /// Stream the script into a writer without building one large string.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(self.preamble.as_bytes())?;
        for fragment in &self.fragments {
            writer.write_all(fragment.text().as_bytes())?;
        }
        writer.write_all(self.postamble.as_bytes())?;
        writer.flush()
    }
}

impl fmt::Display for DumpScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.preamble)?;
        for fragment in &self.fragments {
            f.write_str(fragment.text())?;
        }
        f.write_str(&self.postamble)
    }
}
