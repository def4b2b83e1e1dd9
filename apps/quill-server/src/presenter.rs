//! Turns domain records into API response bodies.

use quill_core::domain::text::excerpt;
use quill_core::domain::{Author, Comment, Paged, Post};
use quill_core::service::{BlogStats, PostDetail, SearchHit};
use quill_shared::dto::{
    AuthorResponse, CommentResponse, CommentedPostResponse, PostDetailResponse, PostListResponse,
    PostResponse, SearchResult, StatsResponse,
};

/// Words kept in a listing excerpt.
pub const EXCERPT_WORDS: usize = 30;

pub fn author(author: &Author) -> AuthorResponse {
    AuthorResponse {
        id: author.id,
        email: author.email.clone(),
        display_name: author.display_name.clone(),
        created_at: author.created_at,
    }
}

pub fn post(post: &Post) -> PostResponse {
    PostResponse {
        id: post.id,
        author_id: post.author_id,
        title: post.title.clone(),
        slug: post.slug.clone(),
        permalink: post.permalink(),
        body: post.body.clone(),
        excerpt: excerpt(&post.body, EXCERPT_WORDS),
        tags: post.tags.clone(),
        status: post.status.to_string(),
        publish_at: post.publish_at,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

pub fn posts(posts: &[Post]) -> Vec<PostResponse> {
    posts.iter().map(post).collect()
}

pub fn post_page(page: &Paged<Post>) -> PostListResponse {
    PostListResponse {
        items: posts(&page.items),
        page: page.page,
        per_page: page.per_page,
        total: page.total,
        total_pages: page.total_pages,
    }
}

pub fn comment(comment: &Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        name: comment.name.clone(),
        body: comment.body.clone(),
        created_at: comment.created_at,
    }
}

pub fn comments(comments: &[Comment]) -> Vec<CommentResponse> {
    comments.iter().map(comment).collect()
}

pub fn post_detail(detail: &PostDetail) -> PostDetailResponse {
    PostDetailResponse {
        post: post(&detail.post),
        comments: comments(&detail.comments),
        similar: posts(&detail.similar),
    }
}

pub fn search_results(hits: &[SearchHit]) -> Vec<SearchResult> {
    hits.iter()
        .map(|hit| SearchResult {
            post: post(&hit.post),
            similarity: hit.similarity,
        })
        .collect()
}

pub fn stats(stats: &BlogStats) -> StatsResponse {
    StatsResponse {
        total_posts: stats.total_published,
        latest: posts(&stats.latest),
        most_commented: stats
            .most_commented
            .iter()
            .map(|c| CommentedPostResponse {
                post: post(&c.post),
                comments: c.comments,
            })
            .collect(),
    }
}
