use super::Filesystem;

/// Ordered set of named storage areas.
///
/// Iteration order is registration order, which is the order areas are
/// flushed in.
#[derive(Default)]
pub struct AreaRegistry {
    areas: Vec<(String, Box<dyn Filesystem>)>,
}

impl AreaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an area. Re-registering a name replaces the handle in place.
    pub fn register(&mut self, name: impl Into<String>, fs: impl Filesystem + 'static) {
        let name = name.into();
        let fs: Box<dyn Filesystem> = Box::new(fs);
        match self.areas.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = fs,
            None => self.areas.push((name, fs)),
        }
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, name: impl Into<String>, fs: impl Filesystem + 'static) -> Self {
        self.register(name, fs);
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Filesystem> {
        self.areas
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, fs)| fs.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.areas.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Filesystem)> {
        self.areas
            .iter()
            .map(|(name, fs)| (name.as_str(), fs.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

impl std::fmt::Debug for AreaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
