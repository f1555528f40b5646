/// Demonstration catalog loaded when the application starts without
/// `--empty`: `(title, author, rating, review count)`.
pub const SEED_BOOKS: &[(&str, &str, f64, u32)] = &[
    ("The Lord of the Rings", "J.R.R. Tolkien", 4.9, 6000),
    ("Harry Potter and the Philosopher's Stone", "J.K. Rowling", 4.8, 4500),
    ("The Hobbit", "J.R.R. Tolkien", 4.7, 4000),
    ("1984", "George Orwell", 4.0, 3200),
    ("Animal Farm", "George Orwell", 4.5, 3100),
    ("Don Quixote", "Miguel de Cervantes", 4.4, 2700),
    ("The Catcher in the Rye", "J.D. Salinger", 2.3, 2300),
    ("Moby Dick", "Herman Melville", 4.9, 5000),
    ("War and Peace", "Leo Tolstoy", 3.1, 2100),
    ("Pride and Prejudice", "Jane Austen", 4.8, 4100),
    ("The Little Prince", "Antoine de Saint-Exupery", 5.0, 3500),
];
