//! Language metadata for front ends that pick a lexer by name or file name.

/// Identification of a language for lexer lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LanguageInfo {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// File name globs of the form `*.ext`.
    pub filenames: &'static [&'static str],
}

/// The GM language.
pub const LANGUAGE: LanguageInfo = LanguageInfo {
    name: "gm",
    aliases: &["GM"],
    filenames: &["*.gm"],
};

impl LanguageInfo {
    /// Returns `true` if `name` is the language name or an alias, ignoring case.
    pub fn matches_name(&self, name: &str) -> bool {
        std::iter::once(self.name)
            .chain(self.aliases.iter().copied())
            .any(|candidate| candidate.eq_ignore_ascii_case(name))
    }

    /// Returns `true` if the last component of `path` matches one of the
    /// file name globs.
    pub fn matches_filename(&self, path: &str) -> bool {
        let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
        self.filenames.iter().any(|glob| match glob.strip_prefix('*') {
            Some(suffix) => file.len() > suffix.len() && file.ends_with(suffix),
            None => file == *glob,
        })
    }
}
