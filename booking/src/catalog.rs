//! Static catalog of theaters, movies and content types.
//!
//! The catalog is read-only after construction. [`Catalog::seeded`] loads the
//! Reel Revival dataset: five Hyderabad theaters and 24 movies across three
//! industries.

use crate::types::{Category, ContentType, Industry, Movie, MovieId, Theater, TheaterId};

/// Read-only collections of theaters and movies
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    theaters: Vec<Theater>,
    movies: Vec<Movie>,
}

impl Catalog {
    /// Build a catalog from explicit collections
    #[must_use]
    pub const fn new(theaters: Vec<Theater>, movies: Vec<Movie>) -> Self {
        Self { theaters, movies }
    }

    /// The Reel Revival dataset
    #[must_use]
    pub fn seeded() -> Self {
        Self::new(seed_theaters(), seed_movies())
    }

    /// Look up a theater by id
    #[must_use]
    pub fn theater(&self, id: TheaterId) -> Option<&Theater> {
        self.theaters.iter().find(|theater| theater.id == id)
    }

    /// All theaters, in catalog order
    #[must_use]
    pub fn theaters(&self) -> &[Theater] {
        &self.theaters
    }

    /// Look up a movie by id
    #[must_use]
    pub fn movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.iter().find(|movie| movie.id == id)
    }

    /// All movies: Hollywood, then Bollywood, then Tollywood
    #[must_use]
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// Movies in a category
    pub fn movies_in(&self, category: Category) -> impl Iterator<Item = &Movie> {
        self.movies
            .iter()
            .filter(move |movie| category.includes(movie.industry))
    }

    /// Movies in `category` whose title or genre contains `query`, ignoring case
    ///
    /// A blank query matches every movie in the category.
    #[must_use]
    pub fn search(&self, category: Category, query: &str) -> Vec<&Movie> {
        let needle = query.trim().to_lowercase();
        self.movies_in(category)
            .filter(|movie| {
                needle.is_empty()
                    || movie.title.to_lowercase().contains(&needle)
                    || movie.genre.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Content types offered for private screenings
    #[must_use]
    pub const fn content_types() -> &'static [ContentType] {
        &ContentType::ALL
    }
}

const UNSPLASH: &str = "https://images.unsplash.com/photo-";
const UNSPLASH_PARAMS: &str = "?ixlib=rb-4.0.3&ixid=M3wxMjA3fDB8MHxwaG90by1wYWdlfHx8fGVufDB8fHx8fA%3D%3D&auto=format&fit=crop";

fn unsplash(photo: &str, width: u32) -> String {
    format!("{UNSPLASH}{photo}{UNSPLASH_PARAMS}&w={width}&q=80")
}

fn theater(
    id: u32,
    name: &str,
    location: &str,
    capacity: u32,
    price: u64,
    photo: &str,
    times: &[&str],
) -> Theater {
    Theater {
        id: TheaterId::new(id),
        name: name.to_string(),
        location: location.to_string(),
        capacity,
        price,
        image: unsplash(photo, 800),
        available_times: times.iter().map(ToString::to_string).collect(),
    }
}

fn seed_theaters() -> Vec<Theater> {
    vec![
        theater(
            1,
            "Shiva Ganga",
            "Asian Shiva Ganga, Kalyan Nagar Road, Survey No.102, Gaddiannaram Rd, near City Bus Stop, Sahithi Nagar, Dilsukhnagar, Hyderabad, Telangana 500060",
            100,
            20_000,
            "1517604931442-7e0c8ed2963c",
            &["10:00 AM", "2:00 PM", "6:00 PM"],
        ),
        theater(
            2,
            "Konark Asian-Mukta-A2",
            "Dilsukhnagar, Konark Theatre Ln, Dilsukhnagar, Hyderabad, Telangana 500060",
            120,
            25_000,
            "1489599849927-2ee91cede3ba",
            &["11:00 AM", "3:00 PM", "7:00 PM"],
        ),
        theater(
            3,
            "Sudarshan",
            "RTC X Rd, Chikkadpally, Himayatnagar, Hyderabad, Telangana 500020",
            220,
            25_000,
            "1524985069026-dd778a71c7b4",
            &["2:00 PM", "9:00 PM"],
        ),
        theater(
            4,
            "AAA Cinemas",
            "Asian Allu Arjun Cinemas, Satyam Theatre Rd, X RoadKumar Basti, Ameerpet, Hyderabad, Telangana 500082",
            320,
            45_000,
            "1440404653325-ab127d49abc1",
            &["10:00 AM", "2:00 PM", "9:00 PM"],
        ),
        theater(
            5,
            "IMax",
            "IMAX Road, NTR Marg, behind of, Khairtabad, Hyderabad, Telangana 500063",
            300,
            35_000,
            "1478720568477-152d9b164e26",
            &["2:00 PM", "6:00 PM", "9:00 PM"],
        ),
    ]
}

// (id, title, year, genre, poster photo, poster width)
type MovieRow = (u32, &'static str, u16, &'static str, &'static str, u32);

const HOLLYWOOD: [MovieRow; 8] = [
    (1, "The Godfather", 1972, "Crime, Drama", "1536440136628-849c177e76a1", 1925),
    (2, "The Shawshank Redemption", 1994, "Drama", "1485846234645-a62644f84728", 1740),
    (3, "Pulp Fiction", 1994, "Crime, Drama", "1594909122845-11baa439b7bf", 1740),
    (4, "The Dark Knight", 2008, "Action, Crime, Drama", "1497124401559-3e75ec2ed794", 1740),
    (13, "Inception", 2010, "Action, Adventure, Sci-Fi", "1526374965328-7f61d4dc18c5", 1740),
    (14, "The Matrix", 1999, "Action, Sci-Fi", "1605810230434-7631ac76ec81", 1740),
    (15, "Forrest Gump", 1994, "Drama, Romance", "1500673922987-e212871fec22", 1740),
    (16, "Interstellar", 2014, "Adventure, Drama, Sci-Fi", "1534447677768-be436bb09401", 1471),
];

const BOLLYWOOD: [MovieRow; 8] = [
    (5, "3 Idiots", 2009, "Comedy, Drama", "1626814026160-2237a95fc5a0", 1740),
    (6, "Lagaan", 2001, "Drama, Sport", "1536440136628-849c177e76a1", 1925),
    (7, "Sholay", 1975, "Action, Adventure, Comedy", "1517604931442-7e0c8ed2963c", 800),
    (8, "Dilwale Dulhania Le Jayenge", 1995, "Drama, Romance", "1614846384571-1e053905bc61", 1744),
    (17, "PK", 2014, "Comedy, Drama, Sci-Fi", "1440404653325-ab127d49abc1", 1470),
    (18, "Kabhi Khushi Kabhie Gham", 2001, "Drama, Romance", "1617914309185-9e63c24a5bdc", 1470),
    (19, "Bajrangi Bhaijaan", 2015, "Action, Comedy, Drama", "1507676184212-d03ab07a01bf", 2069),
    (20, "Dangal", 2016, "Action, Biography, Drama", "1631282715642-c122df9d62f9", 1471),
];

const TOLLYWOOD: [MovieRow; 8] = [
    (9, "Baahubali: The Beginning", 2015, "Action, Drama", "1626814026160-2237a95fc5a0", 1740),
    (10, "Arjun Reddy", 2017, "Action, Drama, Romance", "1478720568477-152d9b164e26", 800),
    (11, "RRR", 2022, "Action, Drama", "1485846234645-a62644f84728", 1740),
    (12, "Magadheera", 2009, "Action, Drama, Fantasy", "1536440136628-849c177e76a1", 1925),
    (21, "Pokiri", 2006, "Action, Crime, Thriller", "1509347528160-9a9e33742cdb", 1470),
    (22, "Eega", 2012, "Action, Comedy, Fantasy", "1598899134739-24c46f58b8c0", 1456),
    (23, "Srimanthudu", 2015, "Action, Drama", "1536440136628-849c177e76a1", 925),
    (24, "Ala Vaikunthapurramuloo", 2020, "Action, Comedy, Drama", "1489599849927-2ee91cede3ba", 1470),
];

fn seed_movies() -> Vec<Movie> {
    [
        (Industry::Hollywood, &HOLLYWOOD),
        (Industry::Bollywood, &BOLLYWOOD),
        (Industry::Tollywood, &TOLLYWOOD),
    ]
    .into_iter()
    .flat_map(|(industry, rows)| {
        rows.iter()
            .map(move |&(id, title, year, genre, photo, width)| Movie {
                id: MovieId::new(id),
                title: title.to_string(),
                year,
                genre: genre.to_string(),
                poster: unsplash(photo, width),
                industry,
            })
    })
    .collect()
}
