use url::form_urlencoded;

/// One way of reaching a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPath {
    /// Request the URL as-is.
    Direct,
    /// Request through a proxy: the prefix followed by the encoded target URL.
    Proxy(String),
}

impl AccessPath {
    /// Direct access first, then each proxy prefix in order.
    pub fn ordered(proxies: &[String]) -> Vec<Self> {
        std::iter::once(Self::Direct)
            .chain(proxies.iter().cloned().map(Self::Proxy))
            .collect()
    }

    /// The URL actually requested for `target` over this path.
    ///
    /// ## Examples
    ///
    /// ```
    /// use merges_lib::AccessPath;
    ///
    /// let proxy = AccessPath::Proxy("https://proxy.example/?url=".to_string());
    /// assert_eq!(
    ///     proxy.resolve("https://merges.ubuntu.com/main.json"),
    ///     "https://proxy.example/?url=https%3A%2F%2Fmerges.ubuntu.com%2Fmain.json"
    /// );
    /// assert_eq!(AccessPath::Direct.resolve("https://a.example/"), "https://a.example/");
    /// ```
    pub fn resolve(&self, target: &str) -> String {
        match self {
            Self::Direct => target.to_string(),
            Self::Proxy(prefix) => {
                let encoded: String = form_urlencoded::byte_serialize(target.as_bytes()).collect();
                format!("{prefix}{encoded}")
            }
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &str {
        match self {
            Self::Direct => "direct",
            Self::Proxy(prefix) => prefix,
        }
    }
}
