/// The folder currently shown in the listing pane.
///
/// Any path is selectable, whether or not the tree has loaded a node for it.
#[derive(Debug, Default, Clone)]
pub struct ActiveSelection {
    current: Option<String>,
}

impl ActiveSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `path` current. Returns `false` if it already was.
    pub fn select(&mut self, path: &str) -> bool {
        if self.current.as_deref() == Some(path) {
            return false;
        }
        self.current = Some(path.to_string());
        true
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
