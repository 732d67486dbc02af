use super::types::{Category, StagedFile};

/// A candidate file that failed its category's extension check. Rejections
/// are always reported to the user, never silently dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub name: String,
    pub extension: String,
    pub category: Category,
}

impl Rejection {
    pub fn message(&self) -> String {
        format!(
            "File type {} is not accepted in the {} section!",
            self.extension,
            self.category.key()
        )
    }
}

/// The categorized set of files staged for upload. Within a category no two
/// entries share both name and size. Created empty at launch, mutated by
/// add/remove, cleared only by an explicit reset.
#[derive(Debug, Default, Clone)]
pub struct StagedFileSet {
    audio: Vec<StagedFile>,
    data: Vec<StagedFile>,
    chat: Vec<StagedFile>,
}

impl StagedFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self, category: Category) -> &[StagedFile] {
        match category {
            Category::Audio => &self.audio,
            Category::Data => &self.data,
            Category::Chat => &self.chat,
        }
    }

    fn files_mut(&mut self, category: Category) -> &mut Vec<StagedFile> {
        match category {
            Category::Audio => &mut self.audio,
            Category::Data => &mut self.data,
            Category::Chat => &mut self.chat,
        }
    }

    /// Stages every candidate whose extension the category accepts, skipping
    /// exact (name, size) duplicates. Returns the rejected candidates so the
    /// caller can surface them.
    pub fn add_files(&mut self, category: Category, candidates: Vec<StagedFile>) -> Vec<Rejection> {
        let mut rejections = Vec::new();

        for candidate in candidates {
            let extension = candidate.extension();
            if !category
                .allowed_extensions()
                .contains(&extension.as_str())
            {
                rejections.push(Rejection {
                    name: candidate.name,
                    extension,
                    category,
                });
                continue;
            }

            let list = self.files_mut(category);
            let duplicate = list
                .iter()
                .any(|f| f.name == candidate.name && f.size == candidate.size);
            if !duplicate {
                list.push(candidate);
            }
        }

        rejections
    }

    /// Removes the entry at `index`. Out-of-range indices are a checked
    /// no-op; returns whether anything was removed.
    pub fn remove_file(&mut self, category: Category, index: usize) -> bool {
        let list = self.files_mut(category);
        if index < list.len() {
            list.remove(index);
            true
        } else {
            false
        }
    }

    pub fn count(&self, category: Category) -> usize {
        self.files(category).len()
    }

    pub fn total(&self) -> usize {
        Category::ALL.iter().map(|c| self.count(*c)).sum()
    }

    /// The submit control is enabled iff anything is staged.
    pub fn can_submit(&self) -> bool {
        self.total() > 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn iter_all(&self) -> impl Iterator<Item = (Category, &StagedFile)> {
        Category::ALL
            .into_iter()
            .flat_map(move |c| self.files(c).iter().map(move |f| (c, f)))
    }
}
