use super::DocumentFile;

/// Stable identity for one entry of the selection, assigned on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectionKey(u64);

#[derive(Debug, Clone)]
pub struct Selected<F> {
    pub key: SelectionKey,
    pub file: F,
}

/// Receives the full selection after every change so the native file
/// input never drifts from what the list shows.
pub trait FileInputMirror<F> {
    fn mirror(&mut self, files: &[&F]);
}

/// The ordered list of files the user picked or dropped.
pub struct FileSelection<F> {
    entries: Vec<Selected<F>>,
    next_key: u64,
    mirror: Option<Box<dyn FileInputMirror<F>>>,
}

impl<F> Default for FileSelection<F> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_key: 0,
            mirror: None,
        }
    }
}

impl<F> FileSelection<F> {
    pub fn attach_mirror(&mut self, mirror: Box<dyn FileInputMirror<F>>) {
        self.mirror = Some(mirror);
        self.sync_mirror();
    }

    /// Appends `files` in the order given.
    pub fn add(&mut self, files: impl IntoIterator<Item = F>) -> usize {
        let before = self.entries.len();
        for file in files {
            let key = SelectionKey(self.next_key);
            self.next_key += 1;
            self.entries.push(Selected { key, file });
        }
        let added = self.entries.len() - before;
        if added > 0 {
            self.sync_mirror();
        }
        added
    }

    /// Out-of-range indices leave the selection untouched.
    pub fn remove(&mut self, index: usize) -> Option<F> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        self.sync_mirror();
        Some(removed.file)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.sync_mirror();
    }

    pub fn first(&self) -> Option<&Selected<F>> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[Selected<F>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sync_mirror(&mut self) {
        if let Some(mirror) = self.mirror.as_mut() {
            let files: Vec<&F> = self.entries.iter().map(|e| &e.file).collect();
            mirror.mirror(&files);
        }
    }
}

impl<F: DocumentFile> FileSelection<F> {
    pub fn summary_label(&self) -> String {
        match self.entries.len() {
            0 => "No files chosen".to_string(),
            1 => "1 file selected".to_string(),
            n => format!("{n} files selected"),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.file.file_name()).collect()
    }
}
