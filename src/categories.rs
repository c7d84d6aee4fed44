/// Mood-based collections, each backed by a TMDB discover query.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Category {
    FeelGood,
    ActionFix,
    MindBenders,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::FeelGood, Category::ActionFix, Category::MindBenders];

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "feel-good" => Some(Category::FeelGood),
            "action-fix" => Some(Category::ActionFix),
            "mind-benders" => Some(Category::MindBenders),
            _ => None,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Category::FeelGood => "feel-good",
            Category::ActionFix => "action-fix",
            Category::MindBenders => "mind-benders",
        }
    }

    /// Short label used on buttons and cards.
    pub fn label(self) -> &'static str {
        match self {
            Category::FeelGood => "Feel Good",
            Category::ActionFix => "Action Fix",
            Category::MindBenders => "Mind Benders",
        }
    }

    /// Heading of the category page.
    pub fn title(self) -> &'static str {
        match self {
            Category::FeelGood => "Feel Good Movies",
            Category::ActionFix => "Action Movies",
            Category::MindBenders => "Mind Bending Thrillers",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Category::FeelGood => {
                "Uplifting comedies and heartwarming stories that'll boost your mood and leave you smiling."
            },
            Category::ActionFix => {
                "Adrenaline-pumping action and thrilling adventures when you need excitement in your life."
            },
            Category::MindBenders => {
                "Thought-provoking thrillers and mind-bending sci-fi that will keep you guessing until the end."
            },
        }
    }

    pub fn gradient(self) -> &'static str {
        match self {
            Category::FeelGood => "from-green-500 to-teal-500",
            Category::ActionFix => "from-red-600 to-orange-500",
            Category::MindBenders => "from-purple-600 to-indigo-500",
        }
    }

    /// Query parameters for `/discover/movie`.
    pub fn discover_params(self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(3);
        match self {
            Category::FeelGood => {
                // comedy, family
                params.push(("with_genres", "35,10751".to_string()));
                params.push(("vote_average.gte", "7".to_string()));
                params.push(("sort_by", "popularity.desc".to_string()));
            },
            Category::ActionFix => {
                // action, adventure
                params.push(("with_genres", "28,12".to_string()));
                params.push(("sort_by", "popularity.desc".to_string()));
            },
            Category::MindBenders => {
                // thriller, mystery, sci-fi
                params.push(("with_genres", "53,9648,878".to_string()));
                params.push(("vote_average.gte", "7.5".to_string()));
                params.push(("sort_by", "vote_average.desc".to_string()));
            },
        }
        params
    }
}

/// Page heading for a category slug; unknown slugs list popular movies under a generic title.
pub fn title_for_slug(slug: &str) -> &'static str {
    Category::from_slug(slug).map(Category::title).unwrap_or("Movies")
}
