//! In-memory users and blogs shared by the mock backend and mock UI.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Store shared between the HTTP backend and every browser context
pub type SharedStore = Arc<Mutex<BlogStore>>;

/// Minimum length for usernames and passwords
pub const MIN_CREDENTIAL_LEN: usize = 3;

/// Store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Required field missing or empty
    #[error("`{0}` is required")]
    MissingField(&'static str),

    /// Field shorter than allowed
    #[error("`{field}` must be at least {min} characters long")]
    TooShort {
        /// Field name
        field: &'static str,
        /// Minimum length
        min: usize,
    },

    /// Username already taken
    #[error("expected `username` to be unique")]
    DuplicateUsername,

    /// Unknown user or wrong password
    #[error("invalid username or password")]
    InvalidCredentials,

    /// No blog with this id
    #[error("blog {0} not found")]
    BlogNotFound(u64),

    /// Only the creator may delete a blog
    #[error("only the creator can delete a blog")]
    Forbidden,

    /// A thread panicked while holding the store
    #[error("store lock poisoned")]
    Poisoned,
}

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login name
    pub username: String,
    /// Display name
    pub name: String,
    #[serde(skip_serializing)]
    password: String,
}

impl User {
    /// Create a user
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            name: name.into(),
            password: password.into(),
        }
    }
}

/// A blog post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    /// Store-assigned id
    pub id: u64,
    /// Title
    pub title: String,
    /// Author
    pub author: String,
    /// URL
    pub url: String,
    /// Like count
    pub likes: u64,
    /// Username of the creator
    pub user: String,
}

/// Users and blogs
#[derive(Debug, Default)]
pub struct BlogStore {
    users: Vec<User>,
    blogs: Vec<Blog>,
    next_id: u64,
}

impl BlogStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty shared store
    #[must_use]
    pub fn shared() -> SharedStore {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Lock a shared store
    ///
    /// # Errors
    ///
    /// Returns `Poisoned` if a previous holder panicked
    pub fn lock(store: &SharedStore) -> Result<MutexGuard<'_, Self>, StoreError> {
        store.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Delete every user and blog
    pub fn reset(&mut self) {
        self.users.clear();
        self.blogs.clear();
    }

    /// Register a user
    ///
    /// # Errors
    ///
    /// Rejects missing or short credentials and duplicate usernames
    pub fn create_user(&mut self, user: User) -> Result<&User, StoreError> {
        if user.username.trim().is_empty() {
            return Err(StoreError::MissingField("username"));
        }
        if user.password.is_empty() {
            return Err(StoreError::MissingField("password"));
        }
        if user.username.len() < MIN_CREDENTIAL_LEN {
            return Err(StoreError::TooShort {
                field: "username",
                min: MIN_CREDENTIAL_LEN,
            });
        }
        if user.password.len() < MIN_CREDENTIAL_LEN {
            return Err(StoreError::TooShort {
                field: "password",
                min: MIN_CREDENTIAL_LEN,
            });
        }
        if self.user(&user.username).is_some() {
            return Err(StoreError::DuplicateUsername);
        }
        self.users.push(user);
        Ok(&self.users[self.users.len() - 1])
    }

    /// Look up a user
    #[must_use]
    pub fn user(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Registered users
    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Check credentials
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for an unknown user or wrong password
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User, StoreError> {
        self.user(username)
            .filter(|u| u.password == password)
            .cloned()
            .ok_or(StoreError::InvalidCredentials)
    }

    /// Create a blog owned by `username`
    ///
    /// # Errors
    ///
    /// Returns `MissingField` if the title or URL is empty
    pub fn create_blog(
        &mut self,
        username: &str,
        title: &str,
        author: &str,
        url: &str,
    ) -> Result<Blog, StoreError> {
        if title.trim().is_empty() {
            return Err(StoreError::MissingField("title"));
        }
        if url.trim().is_empty() {
            return Err(StoreError::MissingField("url"));
        }
        self.next_id += 1;
        let blog = Blog {
            id: self.next_id,
            title: title.to_string(),
            author: author.to_string(),
            url: url.to_string(),
            likes: 0,
            user: username.to_string(),
        };
        self.blogs.push(blog.clone());
        Ok(blog)
    }

    /// Add one like
    ///
    /// # Errors
    ///
    /// Returns `BlogNotFound` for an unknown id
    pub fn like_blog(&mut self, id: u64) -> Result<u64, StoreError> {
        let blog = self
            .blogs
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(StoreError::BlogNotFound(id))?;
        blog.likes += 1;
        Ok(blog.likes)
    }

    /// Delete a blog on behalf of `username`
    ///
    /// # Errors
    ///
    /// `BlogNotFound` for an unknown id, `Forbidden` if `username` is not the creator
    pub fn remove_blog(&mut self, id: u64, username: &str) -> Result<Blog, StoreError> {
        let index = self
            .blogs
            .iter()
            .position(|b| b.id == id)
            .ok_or(StoreError::BlogNotFound(id))?;
        if self.blogs[index].user != username {
            return Err(StoreError::Forbidden);
        }
        Ok(self.blogs.remove(index))
    }

    /// Blogs, most liked first; ties keep creation order
    #[must_use]
    pub fn blogs_by_likes(&self) -> Vec<Blog> {
        let mut blogs = self.blogs.clone();
        blogs.sort_by(|a, b| b.likes.cmp(&a.likes));
        blogs
    }
}
