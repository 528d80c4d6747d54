//! Collaborator configuration.

/// Renderer configuration handed to a [`MarkdownParser`](super::MarkdownParser).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Render single newlines as `<br>`
    pub hard_breaks: bool,

    /// Enable GitHub-flavored extensions (tables, strikethrough, autolinks, task lists)
    pub gfm: bool,

    /// Turn glyph bullets (`•`, `◦`, `▪`, `‣`) at line start into list items
    pub smart_lists: bool,

    /// Curl quotes and dashes while rendering
    pub smart_punctuation: bool,

    /// Strip `**`/`__` emphasis inside ATX headings
    pub clean_heading_emphasis: bool,

    /// Render `[url](url)` links as a single autolink
    pub collapse_url_links: bool,
}

impl ParserConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable hard line breaks.
    pub fn with_hard_breaks(mut self, enabled: bool) -> Self {
        self.hard_breaks = enabled;
        self
    }

    /// Enable or disable GitHub-flavored extensions.
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Enable or disable glyph bullet handling.
    pub fn with_smart_lists(mut self, enabled: bool) -> Self {
        self.smart_lists = enabled;
        self
    }

    /// Enable or disable typographic punctuation.
    pub fn with_smart_punctuation(mut self, enabled: bool) -> Self {
        self.smart_punctuation = enabled;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            hard_breaks: true,
            gfm: true,
            smart_lists: true,
            smart_punctuation: false,
            clean_heading_emphasis: true,
            collapse_url_links: true,
        }
    }
}

/// Attributes the resolver and link fixer rely on.
pub const REQUIRED_ATTRIBUTES: &[&str] = &["id", "target", "rel", "href", "aria-label"];

/// Structural attributes the Markdown parser emits.
const BASELINE_ATTRIBUTES: &[&str] = &[
    "class", "title", "src", "alt", "align", "colspan", "rowspan", "start", "type", "checked",
    "disabled",
];

/// Elements dropped together with their content.
const REMOVED_ELEMENTS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "applet", "link", "base", "noscript", "form",
    "meta", "template", "svg", "math",
];

/// URL schemes stripped from `href` and `src`.
const BLOCKED_URL_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:", "file:"];

/// What an [`HtmlSanitizer`](super::HtmlSanitizer) lets through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizePolicy {
    /// Attribute names kept on elements
    pub allowed_attributes: Vec<String>,

    /// Elements removed with their whole subtree
    pub removed_elements: Vec<String>,

    /// URL scheme prefixes stripped from `href`/`src`
    pub blocked_url_schemes: Vec<String>,
}

impl SanitizePolicy {
    /// Policy with only the attributes the footnote markup needs.
    pub fn strict() -> Self {
        Self {
            allowed_attributes: to_owned(REQUIRED_ATTRIBUTES),
            ..Self::default()
        }
    }

    /// Allow one more attribute.
    pub fn with_attribute(mut self, name: impl Into<String>) -> Self {
        let name = name.into().to_ascii_lowercase();
        if !self.allows_attribute(&name) {
            self.allowed_attributes.push(name);
        }
        self
    }

    /// Whether an attribute survives sanitizing.
    pub fn allows_attribute(&self, name: &str) -> bool {
        self.allowed_attributes.iter().any(|a| a == name)
    }

    /// Whether an element is removed with its content.
    pub fn removes_element(&self, tag: &str) -> bool {
        self.removed_elements.iter().any(|e| e == tag)
    }

    /// Whether a URL uses a blocked scheme.
    pub fn is_blocked_url(&self, url: &str) -> bool {
        let compact: String = url
            .chars()
            .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
            .collect::<String>()
            .to_ascii_lowercase();
        self.blocked_url_schemes
            .iter()
            .any(|scheme| compact.starts_with(scheme.as_str()))
    }
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        let mut allowed = to_owned(REQUIRED_ATTRIBUTES);
        allowed.extend(to_owned(BASELINE_ATTRIBUTES));
        Self {
            allowed_attributes: allowed,
            removed_elements: to_owned(REMOVED_ELEMENTS),
            blocked_url_schemes: to_owned(BLOCKED_URL_SCHEMES),
        }
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
