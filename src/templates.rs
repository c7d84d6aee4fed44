use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::{
    categories::Category,
    models::{MovieDetail, MovieId, MovieSummary, Person},
    tmdb::{backdrop_url, poster_url, profile_url},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";
const SITE_TITLE: &str = "What Should I Watch Tonight | Movie Discovery";

const BADGE_SCRIPT: &str = r#"
const badge = document.getElementById('watchlist-count');
if (badge && window.EventSource) {
  const events = new EventSource('/watchlist/events');
  events.onmessage = (e) => {
    badge.textContent = e.data;
    badge.classList.toggle('hidden', e.data === '0');
  };
}
"#;

const GRID: &str = "grid grid-cols-2 sm:grid-cols-3 md:grid-cols-4 lg:grid-cols-5 gap-4 md:gap-6";
const PRIMARY_BUTTON: &str = "inline-block px-6 py-3 bg-red-600 text-white font-medium rounded-lg hover:bg-red-700 transition-colors";

/// A grid section whose data may have failed to load.
pub struct Section<'a> {
    pub title: Option<&'a str>,
    pub movies: &'a [MovieSummary],
    pub error: Option<&'a str>,
}

pub fn home_page(
    popular: &Section<'_>,
    hero: Option<&MovieSummary>,
    saved: &[MovieSummary],
    return_to: &str,
) -> String {
    let hero_style = hero
        .map(|movie| {
            format!(
                "background-image: url('{}'); background-size: cover; background-position: center;",
                backdrop_url(movie.backdrop_path.as_deref())
            )
        })
        .unwrap_or_default();

    page(
        SITE_TITLE,
        Some(saved.len()),
        html! {
            div class="relative h-[80vh] flex items-center justify-center overflow-hidden bg-black" style=(hero_style) {
                div class="absolute inset-0 bg-gradient-to-t from-black via-black/70 to-black/30" {}
                div class="relative z-10 container mx-auto px-4 text-center text-white" {
                    h1 class="text-4xl md:text-5xl lg:text-6xl font-bold mb-4 drop-shadow-lg" { "What Should I Watch Tonight?" }
                    p class="text-xl md:text-2xl mb-12 max-w-3xl mx-auto text-gray-200 drop-shadow-md" {
                        "Discover perfect movies for your mood. Find your next favorite film in just a few clicks."
                    }
                    div class="grid grid-cols-1 md:grid-cols-3 gap-4 max-w-3xl mx-auto" {
                        @for category in Category::ALL {
                            a class=(format!("flex items-center justify-center gap-3 py-4 px-6 bg-gradient-to-r {} text-white font-medium rounded-lg shadow-lg hover:shadow-xl hover:scale-105 transition-all duration-300", category.gradient()))
                                href=(format!("/category/{}", category.slug())) {
                                (category.label())
                            }
                        }
                    }
                }
            }
            div class="bg-white py-12" {
                (movie_grid(popular, saved, return_to))
            }
        },
    )
}

pub fn search_page(
    query: &str,
    movies: &Section<'_>,
    people: &[Person],
    people_error: Option<&str>,
    saved: &[MovieSummary],
    return_to: &str,
) -> String {
    let error = movies.error.or(people_error);
    let nothing_found = error.is_none() && movies.movies.is_empty() && people.is_empty();

    page(
        &format!("Search: {query}"),
        Some(saved.len()),
        html! {
            div class="pt-20 pb-12 min-h-screen bg-gray-50" {
                div class="container mx-auto px-4" {
                    h1 class="text-3xl font-bold mb-2 text-gray-900" { "Search Results for \"" (query) "\"" }
                    p class="text-gray-600 mb-8" { "Showing results for movies and people" }

                    @if let Some(message) = error {
                        div class="mb-8 p-4 bg-red-50 text-red-700 rounded-lg" { (message) }
                    }

                    @if !people.is_empty() {
                        div class="mb-12" {
                            h2 class="text-2xl font-bold mb-6 text-gray-900" { "People" }
                            div class="grid grid-cols-2 sm:grid-cols-3 md:grid-cols-4 lg:grid-cols-6 gap-4 md:gap-6" {
                                @for person in people {
                                    (person_tile(person))
                                }
                            }
                        }
                    }

                    @if movies.error.is_none() {
                        div {
                            h2 class="text-2xl font-bold mb-6 text-gray-900" { "Movies" }
                            (movie_grid(movies, saved, return_to))
                        }
                    }

                    @if nothing_found {
                        div class="text-center py-12" {
                            h3 class="text-xl font-medium text-gray-900 mb-2" { "No results found" }
                            p class="text-gray-600 mb-6" {
                                "We couldn't find any movies or people matching \"" (query) "\""
                            }
                            a class=(PRIMARY_BUTTON) href="/" { "Return to Home" }
                        }
                    }
                }
            }
        },
    )
}

pub fn categories_page(saved_count: usize) -> String {
    page(
        "Categories",
        Some(saved_count),
        html! {
            div class="pt-20 pb-12 min-h-screen bg-gray-50" {
                div class="container mx-auto px-4" {
                    h1 class="text-3xl font-bold mb-2 text-gray-900" { "Categories" }
                    p class="text-gray-600 mb-8" { "Find the perfect movie for your mood from our curated collections" }
                    div class="grid grid-cols-1 md:grid-cols-3 gap-6" {
                        @for category in Category::ALL {
                            (category_card(category))
                        }
                    }
                }
            }
        },
    )
}

pub fn category_page(
    title: &str,
    section: &Section<'_>,
    saved: &[MovieSummary],
    return_to: &str,
) -> String {
    page(
        title,
        Some(saved.len()),
        html! {
            div class="pt-20 pb-12 min-h-screen bg-gray-50" {
                div class="container mx-auto px-4" {
                    h1 class="text-3xl font-bold mb-8 text-gray-900" { (title) }
                    (movie_grid(section, saved, return_to))
                }
            }
        },
    )
}

pub fn movie_page(movie: &MovieDetail, saved: &[MovieSummary], return_to: &str) -> String {
    let in_watchlist = is_saved(saved, movie.id);
    let rating = format!("{:.1}/10", movie.vote_average);
    let backdrop_style = format!(
        "background-image: url('{}'); background-size: cover; background-position: center;",
        backdrop_url(movie.backdrop_path.as_deref())
    );
    let poster = poster_url(movie.poster_path.as_deref());
    let similar: Vec<MovieSummary> = movie.similar.results.iter().take(10).cloned().collect();

    page(
        &format!("{} | Movie Details", movie.title),
        Some(saved.len()),
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="relative h-[70vh] bg-black" style=(backdrop_style) {
                    div class="absolute inset-0 bg-gradient-to-t from-black via-black/70 to-transparent" {}
                    div class="absolute top-20 left-4 z-10" {
                        a class="flex items-center text-white bg-black/50 hover:bg-black/70 px-4 py-2 rounded-full transition-colors" href="javascript:history.back()" {
                            "← Back"
                        }
                    }
                    div class="absolute bottom-0 left-0 right-0 p-8 text-white" {
                        div class="container mx-auto flex flex-col md:flex-row items-start md:items-end" {
                            div class="hidden md:block rounded-lg overflow-hidden shadow-2xl w-48 border-4 border-white -translate-y-16" {
                                img class="w-full h-auto" src=(poster) alt=(format!("{} poster", movie.title));
                            }
                            div class="md:ml-8 flex-1" {
                                h1 class="text-3xl md:text-4xl font-bold mb-2" { (movie.title) }
                                @if let Some(tagline) = movie.tagline() {
                                    p class="text-xl text-gray-300 mb-4 italic" { "\"" (tagline) "\"" }
                                }
                                div class="flex flex-wrap gap-4 mb-4 text-sm" {
                                    span { (movie.year_label()) }
                                    span { (movie.runtime_label()) }
                                    span { span class="text-yellow-400" { "★ " } (rating) }
                                }
                                div class="flex flex-wrap gap-2 mb-6" {
                                    @for genre in &movie.genres {
                                        span class="px-3 py-1 bg-white/20 rounded-full text-sm" { (genre.name) }
                                    }
                                }
                                div class="flex flex-wrap gap-3 items-start" {
                                    @if let Some(trailer) = movie.trailer() {
                                        details class="group" {
                                            summary class="list-none cursor-pointer px-4 py-2 bg-red-600 hover:bg-red-700 text-white rounded-lg transition-colors" {
                                                "Watch Trailer"
                                            }
                                            div class="fixed inset-0 z-50 flex items-center justify-center p-4 bg-black/80" {
                                                div class="relative w-full max-w-4xl pt-[56.25%]" {
                                                    iframe class="absolute inset-0 w-full h-full" src=(trailer.embed_url()) title=(trailer.name)
                                                        allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen {}
                                                }
                                            }
                                        }
                                    }
                                    (watchlist_button(&movie.summary(), in_watchlist, return_to))
                                }
                            }
                        }
                    }
                }

                div class="container mx-auto px-4 py-8" {
                    div class="grid grid-cols-1 lg:grid-cols-3 gap-8" {
                        div class="lg:col-span-2" {
                            h2 class="text-2xl font-bold mb-4 text-gray-900" { "Overview" }
                            p class="text-gray-700 mb-8 leading-relaxed" {
                                @if movie.overview.is_empty() { "No overview available." } @else { (movie.overview) }
                            }
                            @if !movie.credits.cast.is_empty() {
                                div class="mb-8" {
                                    h2 class="text-2xl font-bold mb-4 text-gray-900" { "Cast" }
                                    div class="grid grid-cols-2 sm:grid-cols-3 md:grid-cols-4 lg:grid-cols-5 gap-4" {
                                        @for member in movie.credits.cast.iter().take(10) {
                                            div class="text-center" {
                                                div class="rounded-lg overflow-hidden mb-2" {
                                                    img class="w-full h-auto" src=(profile_url(member.profile_path.as_deref())) alt=(member.name);
                                                }
                                                h3 class="font-medium text-gray-900 text-sm" { (member.name) }
                                                p class="text-gray-600 text-xs" { (member.character) }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                        div {
                            h2 class="text-2xl font-bold mb-4 text-gray-900" { "Details" }
                            div class="bg-white rounded-lg shadow-md p-6 space-y-4" {
                                (detail_row("Status", "Released"))
                                (detail_row("Release Date", if movie.release_date.is_empty() { "Unknown" } else { movie.release_date.as_str() }))
                                (detail_row("Runtime", &movie.runtime_label()))
                                (detail_row("Rating", &rating))
                                @if !movie.credits.crew.is_empty() {
                                    (detail_row("Director", movie.director().unwrap_or("Unknown")))
                                }
                            }
                        }
                    }

                    @if !similar.is_empty() {
                        div class="mt-12" {
                            h2 class="text-2xl font-bold mb-6 text-gray-900" { "Similar Movies" }
                            (movie_grid(&Section { title: None, movies: &similar, error: None }, saved, return_to))
                        }
                    }
                }
            }
        },
    )
}

pub fn watchlist_page(saved: &[MovieSummary]) -> String {
    page(
        "My Watchlist",
        Some(saved.len()),
        html! {
            div class="pt-20 pb-12 min-h-screen bg-gray-50" {
                div class="container mx-auto px-4" {
                    div class="flex justify-between items-center mb-8" {
                        h1 class="text-3xl font-bold text-gray-900" { "My Watchlist" }
                        @if !saved.is_empty() {
                            form method="post" action="/watchlist/clear" onsubmit="return confirm('Are you sure you want to clear your entire watchlist?');" {
                                button class="flex items-center gap-2 px-4 py-2 bg-red-100 hover:bg-red-200 text-red-700 rounded-lg transition-colors" type="submit" {
                                    "Clear Watchlist"
                                }
                            }
                        }
                    }

                    @if saved.is_empty() {
                        div class="text-center py-16" {
                            h2 class="text-xl font-medium text-gray-900 mb-2" { "Your watchlist is empty" }
                            p class="text-gray-600 mb-6" { "Save movies you want to watch later by clicking the bookmark icon" }
                            a class=(PRIMARY_BUTTON) href="/" { "Discover Movies" }
                        }
                    } @else {
                        div class=(GRID) {
                            @for movie in saved {
                                (movie_card(movie, true, "/watchlist"))
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn not_found_page() -> String {
    page(
        "Movie not found",
        None,
        html! {
            div class="pt-20 min-h-screen bg-gray-100" {
                div class="container mx-auto px-4 py-12 text-center" {
                    div class="bg-red-50 border border-red-200 text-red-700 px-4 py-3 rounded-lg" {
                        p { "Movie not found" }
                        a class="mt-4 inline-block text-red-600 hover:underline" href="/" { "Return to Home" }
                    }
                }
            }
        },
    )
}

pub fn error_page(headline: &str, detail: &str) -> String {
    page(
        "Something went wrong",
        None,
        html! {
            div class="min-h-screen flex items-center justify-center bg-gray-100 p-4" {
                div class="bg-white rounded-lg shadow-xl p-8 max-w-md w-full text-center" {
                    h1 class="text-2xl font-bold text-gray-900 mb-2" { "Something went wrong" }
                    p class="text-gray-600 mb-6" { (headline) }
                    div class="w-full p-4 bg-gray-100 rounded-lg mb-6 overflow-auto text-left" {
                        p class="text-sm font-mono text-gray-800" { (detail) }
                    }
                    a class=(PRIMARY_BUTTON) href="/" { "Back to Home" }
                }
            }
        },
    )
}

fn page(title: &str, saved_count: Option<usize>, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body class="flex flex-col min-h-screen" {
                (header(saved_count))
                main class="flex-grow" { (body) }
                (footer())
                script { (PreEscaped(BADGE_SCRIPT)) }
            }
        }
    }
    .into_string()
}

fn header(saved_count: Option<usize>) -> Markup {
    let count = saved_count.unwrap_or(0);
    let badge_class = if count == 0 {
        "hidden ml-1 px-2 rounded-full bg-red-600 text-white text-xs"
    } else {
        "ml-1 px-2 rounded-full bg-red-600 text-white text-xs"
    };

    html! {
        header class="fixed top-0 left-0 right-0 z-40 bg-gray-900/90 backdrop-blur-md shadow-md" {
            div class="container mx-auto px-4 flex items-center justify-between h-16 md:h-20" {
                a class="text-xl font-bold text-white" href="/" {
                    span class="text-red-600" { "▶ " } "MoviesAdda"
                }
                nav class="flex items-center space-x-6 text-gray-200" {
                    a class="hover:text-red-500 transition-colors" href="/categories" { "Categories" }
                    a class="flex items-center hover:text-red-500 transition-colors" href="/watchlist" {
                        "Watchlist"
                        span id="watchlist-count" class=(badge_class) { (count) }
                    }
                    form method="get" action="/search" {
                        input class="pl-4 pr-4 py-2 rounded-full w-40 md:w-64 bg-black/30 text-white placeholder:text-gray-300 focus:outline-none"
                            type="text" name="q" placeholder="Search movies or actors..." required;
                    }
                }
            }
        }
    }
}

fn footer() -> Markup {
    html! {
        footer class="bg-gray-900 text-gray-400 py-8" {
            div class="container mx-auto px-4 flex flex-col md:flex-row justify-between gap-4 text-sm" {
                div {
                    p class="text-white font-bold" { "MoviesAdda" }
                    p { "Find the perfect movie for your mood." }
                }
                nav class="flex gap-6" {
                    a class="hover:text-white" href="/" { "Home" }
                    a class="hover:text-white" href="/categories" { "Categories" }
                    a class="hover:text-white" href="/watchlist" { "Watchlist" }
                }
                p {
                    "Movie data provided by "
                    a class="underline hover:text-white" href="https://www.themoviedb.org" target="_blank" rel="noopener noreferrer" { "TMDB" }
                    ". This product uses the TMDB API but is not endorsed or certified by TMDB."
                }
            }
        }
    }
}

fn movie_grid(section: &Section<'_>, saved: &[MovieSummary], return_to: &str) -> Markup {
    html! {
        div class="w-full py-8" {
            div class="container mx-auto px-4" {
                @if let Some(title) = section.title {
                    h2 class="text-2xl font-bold mb-6" { (title) }
                }
                @if let Some(error) = section.error {
                    div class="bg-red-50 border border-red-200 text-red-700 px-4 py-3 rounded-lg text-center" {
                        p { "Error: " (error) }
                        p class="mt-2 text-sm" { "Please try again later or check your API configuration." }
                    }
                } @else if section.movies.is_empty() {
                    div class="bg-blue-50 border border-blue-200 text-blue-700 px-4 py-3 rounded-lg text-center" {
                        p { "No movies found." }
                    }
                } @else {
                    div class=(GRID) {
                        @for movie in section.movies {
                            (movie_card(movie, is_saved(saved, movie.id), return_to))
                        }
                    }
                }
            }
        }
    }
}

fn movie_card(movie: &MovieSummary, in_watchlist: bool, return_to: &str) -> Markup {
    html! {
        div class="group relative overflow-hidden rounded-lg shadow-md transition-transform duration-300 hover:scale-[1.02] hover:shadow-xl bg-white" {
            a href=(format!("/movie/{}", movie.id)) {
                div class="aspect-[2/3] bg-gray-200" {
                    img class="h-full w-full object-cover" src=(poster_url(movie.poster_path.as_deref())) alt=(format!("{} poster", movie.title)) loading="lazy";
                }
                div class="absolute inset-0 bg-gradient-to-t from-black/70 to-transparent opacity-0 group-hover:opacity-100 transition-opacity duration-300" {}
                div class="absolute bottom-0 left-0 right-0 p-4 text-white opacity-0 group-hover:opacity-100 transition-all duration-300" {
                    h3 class="font-bold text-lg line-clamp-2" { (movie.title) }
                }
                div class="absolute top-2 left-2 flex items-center gap-1.5 px-2 py-1 rounded-full bg-black/60 text-white text-xs font-medium" {
                    span class="text-yellow-400" { "★" }
                    span { (movie.rating_label()) }
                }
                div class="absolute bottom-2 left-2 px-2 py-1 rounded-full bg-black/60 text-white text-xs font-medium" {
                    (movie.year_label())
                }
            }
            div class="absolute top-2 right-2" {
                (bookmark_form(movie, in_watchlist, return_to))
            }
        }
    }
}

/// Small bookmark toggle used on grid cards.
fn bookmark_form(movie: &MovieSummary, in_watchlist: bool, return_to: &str) -> Markup {
    let (action, label, icon, icon_class) = if in_watchlist {
        ("/watchlist/remove", "Remove from watchlist", "✓", "text-emerald-400")
    } else {
        ("/watchlist/add", "Add to watchlist", "+", "text-white")
    };

    html! {
        form method="post" action=(action) {
            (toggle_fields(movie, in_watchlist, return_to))
            button class="p-2 w-9 h-9 rounded-full bg-black/60 hover:bg-black/80 transition-colors duration-200" type="submit" aria-label=(label) title=(label) {
                span class=(icon_class) { (icon) }
            }
        }
    }
}

/// Full-size toggle on the detail page.
fn watchlist_button(movie: &MovieSummary, in_watchlist: bool, return_to: &str) -> Markup {
    let (action, label, class) = if in_watchlist {
        ("/watchlist/remove", "✓ In Watchlist", "bg-green-600 hover:bg-green-700 text-white")
    } else {
        ("/watchlist/add", "+ Add to Watchlist", "bg-white hover:bg-gray-200 text-gray-900")
    };

    html! {
        form method="post" action=(action) {
            (toggle_fields(movie, in_watchlist, return_to))
            button class=(format!("flex items-center gap-2 px-4 py-2 rounded-lg transition-colors {class}")) type="submit" {
                (label)
            }
        }
    }
}

fn toggle_fields(movie: &MovieSummary, in_watchlist: bool, return_to: &str) -> Markup {
    html! {
        @if in_watchlist {
            input type="hidden" name="id" value=(movie.id);
        } @else {
            input type="hidden" name="movie" value=(summary_payload(movie));
        }
        input type="hidden" name="return_to" value=(return_to);
    }
}

fn person_tile(person: &Person) -> Markup {
    html! {
        div class="flex flex-col items-center" {
            div class="rounded-full overflow-hidden w-24 h-24 mb-3" {
                img class="w-full h-full object-cover" src=(profile_url(person.profile_path.as_deref())) alt=(person.name);
            }
            h3 class="text-center font-medium text-gray-900" { (person.name) }
            @if let Some(title) = person.known_for_title() {
                p class="text-center text-xs text-gray-600 mt-1" { "Known for: " (title) }
            }
        }
    }
}

fn category_card(category: Category) -> Markup {
    html! {
        a class="block rounded-xl overflow-hidden shadow-md hover:shadow-xl transition-shadow duration-300" href=(format!("/category/{}", category.slug())) {
            div class=(format!("h-full bg-gradient-to-br {} p-6 md:p-8", category.gradient())) {
                div class="flex flex-col h-full" {
                    h3 class="text-2xl font-bold text-white mb-2" { (category.label()) }
                    p class="text-white/80 mb-6" { (category.description()) }
                    div class="mt-auto" {
                        span class="inline-block px-4 py-2 bg-white/20 hover:bg-white/30 rounded-lg text-white transition-colors" { "Explore" }
                    }
                }
            }
        }
    }
}

fn detail_row(label: &str, value: &str) -> Markup {
    html! {
        div {
            h3 class="text-sm text-gray-500" { (label) }
            p class="font-medium text-gray-900" { (value) }
        }
    }
}

/// JSON summary carried by the add form so saving never needs a catalog round trip.
fn summary_payload(movie: &MovieSummary) -> String {
    serde_json::to_string(movie).unwrap_or_default()
}

fn is_saved(saved: &[MovieSummary], id: MovieId) -> bool {
    saved.iter().any(|m| m.id == id)
}
