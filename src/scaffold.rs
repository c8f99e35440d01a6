//! Fixed entries seeded into the tree before the first revision.
//!
//! Both names contain characters [`slugify`] never emits (`.` and `_`), so a
//! page can never overwrite a scaffold entry.

use crate::slug::slugify;
use crate::tree::TreeState;

/// Entry holding the page rendering template.
pub const TEMPLATE_KEY: &str = "_template.html";

/// Entry redirecting the repository root to the main page.
pub const INDEX_KEY: &str = "index.html";

const DEFAULT_TEMPLATE: &str = "\
<!DOCTYPE html>
<html>
<head>
<meta charset=\"utf-8\">
<title>{{title}}</title>
</head>
<body>
<h1>{{title}}</h1>
{{body}}
</body>
</html>
";

/// The scaffold entries for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scaffold {
    main_page: String,
    template: String,
}

impl Scaffold {
    /// Scaffold whose root pointer redirects to `main_page`.
    #[must_use]
    pub fn new(main_page: &str) -> Self {
        Self {
            main_page: main_page.to_owned(),
            template: DEFAULT_TEMPLATE.to_owned(),
        }
    }

    /// Replace the built-in template.
    #[must_use]
    pub fn with_template(mut self, template: &str) -> Self {
        template.clone_into(&mut self.template);
        self
    }

    /// Path key the root pointer redirects to.
    #[must_use]
    pub fn main_page_key(&self) -> String {
        slugify(&self.main_page)
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Contents of [`INDEX_KEY`].
    #[must_use]
    pub fn index_html(&self) -> String {
        let target = self.main_page_key();
        format!(
            "<!DOCTYPE html>\n\
             <html>\n\
             <head>\n\
             <meta charset=\"utf-8\">\n\
             <meta http-equiv=\"refresh\" content=\"0; url={target}\">\n\
             </head>\n\
             <body><a href=\"{target}\">{target}</a></body>\n\
             </html>\n"
        )
    }

    /// Put every scaffold entry missing from `tree`. Existing entries are
    /// left alone so a resumed repository keeps its own. Returns how many
    /// entries were added.
    pub fn seed(&self, tree: &mut TreeState) -> usize {
        let mut added = 0;
        if !tree.contains(TEMPLATE_KEY) {
            tree.put(TEMPLATE_KEY, self.template.clone().into_bytes());
            added += 1;
        }
        if !tree.contains(INDEX_KEY) {
            tree.put(INDEX_KEY, self.index_html().into_bytes());
            added += 1;
        }
        added
    }
}

impl Default for Scaffold {
    fn default() -> Self {
        Self::new("Main Page")
    }
}
