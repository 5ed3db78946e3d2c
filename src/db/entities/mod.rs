//! SeaORM entities backing the snippet box.
//!
//! Each table lives in its own module; `snippet_tags` is the join table of the
//! many-to-many relation between snippets and tags.

pub mod snippet;
pub mod snippet_tag;
pub mod tag;
pub mod user;

pub mod prelude {
    pub use super::user::Entity as User;
    pub use super::user::Model as UserModel;
    pub use super::user::ActiveModel as UserActiveModel;
    pub use super::user::Column as UserColumn;

    pub use super::tag::Entity as Tag;
    pub use super::tag::Model as TagModel;
    pub use super::tag::ActiveModel as TagActiveModel;
    pub use super::tag::Column as TagColumn;

    pub use super::snippet::Entity as Snippet;
    pub use super::snippet::Model as SnippetModel;
    pub use super::snippet::ActiveModel as SnippetActiveModel;
    pub use super::snippet::Column as SnippetColumn;

    pub use super::snippet_tag::Entity as SnippetTag;
    pub use super::snippet_tag::Model as SnippetTagModel;
    pub use super::snippet_tag::ActiveModel as SnippetTagActiveModel;
    pub use super::snippet_tag::Column as SnippetTagColumn;
}
