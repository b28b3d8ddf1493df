use std::cmp::Ordering;

use serde_json::{Value, json};
use uuid::Uuid;

use super::{
    MockDb, MockRegistry, MockRequest, bind, fail, lenient_i64, ok, paginate, store::now_iso,
};
use crate::{
    api::HttpMethod,
    models::{ApiResponse, Article, Category},
};

pub fn register(registry: &mut MockRegistry, db: &MockDb) {
    // --- Categories ---
    bind(registry, db, HttpMethod::Get, "/knowledge/category/tree", category_tree);
    bind(registry, db, HttpMethod::Get, "/knowledge/category/page", category_page);
    bind(registry, db, HttpMethod::Get, "/knowledge/category/:id", get_category);
    bind(registry, db, HttpMethod::Post, "/knowledge/category", create_category);
    bind(registry, db, HttpMethod::Put, "/knowledge/category/:id", update_category);
    bind(registry, db, HttpMethod::Delete, "/knowledge/category/:id", delete_category);

    // --- Articles ---
    bind(registry, db, HttpMethod::Get, "/knowledge/article/page", article_page);
    bind(registry, db, HttpMethod::Get, "/knowledge/article/statistics", article_statistics);
    bind(registry, db, HttpMethod::Get, "/knowledge/article/:id", get_article);
    bind(registry, db, HttpMethod::Post, "/knowledge/article", create_article);
    bind(registry, db, HttpMethod::Put, "/knowledge/article/:id", update_article);
    bind(registry, db, HttpMethod::Delete, "/knowledge/article/batch", batch_delete_articles);
    bind(registry, db, HttpMethod::Delete, "/knowledge/article/:id", delete_article);
    bind(registry, db, HttpMethod::Post, "/knowledge/article/:id/read", read_article);
    bind(registry, db, HttpMethod::Post, "/knowledge/article/:id/publish", publish_article);
    bind(registry, db, HttpMethod::Post, "/knowledge/article/:id/offline", offline_article);
    bind(registry, db, HttpMethod::Put, "/knowledge/article/:id/status", update_article_status);

    // --- Favorites ---
    bind(registry, db, HttpMethod::Get, "/knowledge/favorite/page", favorite_page);
    bind(registry, db, HttpMethod::Get, "/knowledge/favorite/count", favorite_count);
    bind(registry, db, HttpMethod::Post, "/knowledge/favorite/:articleId", add_favorite);
    bind(registry, db, HttpMethod::Delete, "/knowledge/favorite/:articleId", remove_favorite);
    bind(registry, db, HttpMethod::Get, "/knowledge/favorite/:articleId/status", favorite_status);
}

fn page_args(req: &MockRequest, default_size: i64) -> (u64, u64) {
    let current = req.param_i64("currentPage").unwrap_or(1).max(1) as u64;
    let size = req.param_i64("size").unwrap_or(default_size).max(1) as u64;
    (current, size)
}

// --- Categories ---

/// Nests categories under their parents. Roots are those without a (known) parent.
fn category_tree(db: &MockDb, _req: &MockRequest) -> ApiResponse<Value> {
    fn children_of(all: &[Category], parent: i64) -> Vec<Category> {
        all.iter()
            .filter(|c| c.parent_id == Some(parent))
            .map(|c| {
                let mut node = c.clone();
                let children = children_of(all, c.id);
                node.children = (!children.is_empty()).then_some(children);
                node
            })
            .collect()
    }

    let data = db.lock();
    let all = &data.categories;
    let mut roots: Vec<Category> = all
        .iter()
        .filter(|c| c.parent_id.is_none_or(|p| all.iter().all(|other| other.id != p)))
        .map(|c| {
            let mut node = c.clone();
            let children = children_of(all, c.id);
            node.children = (!children.is_empty()).then_some(children);
            node
        })
        .collect();
    roots.sort_by_key(|c| c.sort_order.unwrap_or(i32::MAX));

    ok(roots, "Fetched category tree")
}

fn category_page(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let data = db.lock();
    let mut categories: Vec<Category> = data.categories.clone();

    if let Some(parent_id) = req.param_i64("parentId") {
        categories.retain(|c| c.parent_id == Some(parent_id));
    }
    if let Some(name) = req.param_str("categoryName") {
        categories.retain(|c| c.category_name.contains(&name));
    }
    if let Some(status) = req.param_i64("status") {
        categories.retain(|c| c.status == Some(status as i32));
    }

    let (current, size) = page_args(req, 10);
    ok(paginate(&categories, current, size), "Query successful")
}

fn get_category(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let id = req.path_i64("id");
    match db.lock().categories.iter().find(|c| Some(c.id) == id) {
        Some(category) => ok(category, "Fetched category"),
        None => fail("Category not found", "404"),
    }
}

fn create_category(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(name) = req.param_str("categoryName") else {
        return fail("Category name is required", "400");
    };

    let mut data = db.lock();
    if data.categories.iter().any(|c| c.category_name == name) {
        return fail("Category name already exists", "400");
    }

    let id = data.next_category_id;
    data.next_category_id += 1;
    let category = Category {
        id,
        parent_id: req.param_i64("parentId"),
        category_name: name,
        category_code: req.param_str("categoryCode"),
        description: req.param_str("description"),
        icon: req.param_str("icon"),
        sort_order: req.param_i64("sortOrder").map(|v| v as i32),
        status: Some(req.param_i64("status").unwrap_or(1) as i32),
        article_count: Some(0),
        children: None,
    };
    data.categories.push(category.clone());
    ok(category, "Category created")
}

fn update_category(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let id = req.path_i64("id");
    let mut data = db.lock();
    let Some(category) = data.categories.iter_mut().find(|c| Some(c.id) == id) else {
        return fail("Category not found", "404");
    };

    if let Some(name) = req.param_str("categoryName") {
        category.category_name = name;
    }
    if let Some(code) = req.param_str("categoryCode") {
        category.category_code = Some(code);
    }
    if let Some(description) = req.param_str("description") {
        category.description = Some(description);
    }
    if let Some(parent_id) = req.param_i64("parentId") {
        category.parent_id = Some(parent_id);
    }
    if let Some(sort_order) = req.param_i64("sortOrder") {
        category.sort_order = Some(sort_order as i32);
    }
    if let Some(status) = req.param_i64("status") {
        category.status = Some(status as i32);
    }
    ok(category.clone(), "Category updated")
}

fn delete_category(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(id) = req.path_i64("id") else {
        return fail("Category not found", "404");
    };

    let mut data = db.lock();
    if data.articles.iter().any(|a| a.category_id == Some(id)) {
        return fail("Category still has articles", "400");
    }
    if data.categories.iter().any(|c| c.parent_id == Some(id)) {
        return fail("Category still has sub-categories", "400");
    }

    let before = data.categories.len();
    data.categories.retain(|c| c.id != id);
    if data.categories.len() == before {
        return fail("Category not found", "404");
    }
    ok(Value::Null, "Category deleted")
}

// --- Articles ---

fn compare_articles(a: &Article, b: &Article, field: &str) -> Ordering {
    match field {
        "readCount" => a.read_count.cmp(&b.read_count),
        "favoriteCount" => a.favorite_count.cmp(&b.favorite_count),
        "createdAt" => a.created_at.cmp(&b.created_at),
        // ISO-8601 timestamps order lexically.
        _ => a.published_at.cmp(&b.published_at),
    }
}

/// article_page
///
/// Published articles by default. `status` selects another state; keyword matches title,
/// summary, content and tags.
fn article_page(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let status = req.param_i64("status").unwrap_or(1) as i32;
    let sort_field = req
        .param_str("sortField")
        .unwrap_or_else(|| "publishedAt".to_string());
    let descending = req
        .param_str("sortDirection")
        .is_none_or(|direction| !direction.eq_ignore_ascii_case("asc"));

    let data = db.lock();
    let mut articles: Vec<Article> = data
        .articles
        .iter()
        .filter(|a| a.status == status)
        .cloned()
        .collect();

    if let Some(keyword) = req.param_str("keyword") {
        let matches = |field: &Option<String>| field.as_deref().is_some_and(|v| v.contains(&keyword));
        articles.retain(|a| {
            a.title.contains(&keyword)
                || matches(&a.summary)
                || matches(&a.content)
                || matches(&a.tags)
        });
    }
    if let Some(title) = req.param_str("title") {
        articles.retain(|a| a.title.contains(&title));
    }
    if let Some(category_id) = req.param_i64("categoryId") {
        articles.retain(|a| a.category_id == Some(category_id));
    }

    articles.sort_by(|a, b| {
        let ordering = compare_articles(a, b, &sort_field);
        if descending { ordering.reverse() } else { ordering }
    });

    let (current, size) = page_args(req, 12);
    ok(paginate(&articles, current, size), "Query successful")
}

/// Viewing an article counts as a read.
fn get_article(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let id = req.path_param("id").unwrap_or_default().to_string();
    let user_id = db.current_user_id(req);

    let mut data = db.lock();
    let favorited = user_id.map(|user| data.is_favorite(user, &id));
    let Some(article) = data.article_mut(&id) else {
        return fail("Article not found", "404");
    };

    article.read_count += 1;
    let mut view = article.clone();
    view.is_favorited = favorited;
    ok(view, "Fetched article")
}

fn create_article(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let (Some(title), Some(content)) = (req.param_str("title"), req.param_str("content")) else {
        return fail("Title and content are required", "400");
    };
    let Some(category_id) = req.param_i64("categoryId") else {
        return fail("Category is required", "400");
    };

    let author = db.claims(req);
    let mut data = db.lock();
    let Some(category_name) = data.category_name(category_id) else {
        return fail("Category not found", "404");
    };

    let status = req.param_i64("status").unwrap_or(0) as i32;
    let now = now_iso();
    let article = Article {
        id: Uuid::new_v4().to_string(),
        category_id: Some(category_id),
        category_name: Some(category_name),
        title,
        summary: req.param_str("summary"),
        content: Some(content),
        cover_image: req.param_str("coverImage"),
        tags: req.param_str("tags"),
        author_id: author.as_ref().map(|claims| claims.sub),
        author_name: author.map(|claims| claims.username),
        read_count: 0,
        favorite_count: 0,
        status,
        is_favorited: None,
        published_at: (status == 1).then(|| now.clone()),
        created_at: Some(now.clone()),
        updated_at: Some(now),
    };
    data.articles.push(article.clone());
    ok(article, "Article created")
}

fn update_article(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let id = req.path_param("id").unwrap_or_default().to_string();
    let mut data = db.lock();

    let category_name = match req.param_i64("categoryId") {
        Some(category_id) => match data.category_name(category_id) {
            Some(name) => Some((category_id, name)),
            None => return fail("Category not found", "404"),
        },
        None => None,
    };

    let Some(article) = data.article_mut(&id) else {
        return fail("Article not found", "404");
    };

    if let Some((category_id, name)) = category_name {
        article.category_id = Some(category_id);
        article.category_name = Some(name);
    }
    if let Some(title) = req.param_str("title") {
        article.title = title;
    }
    if let Some(summary) = req.param_str("summary") {
        article.summary = Some(summary);
    }
    if let Some(content) = req.param_str("content") {
        article.content = Some(content);
    }
    if let Some(cover) = req.param_str("coverImage") {
        article.cover_image = Some(cover);
    }
    if let Some(tags) = req.param_str("tags") {
        article.tags = Some(tags);
    }
    article.updated_at = Some(now_iso());
    ok(article.clone(), "Article updated")
}

fn delete_article(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let id = req.path_param("id").unwrap_or_default().to_string();
    let mut data = db.lock();
    let before = data.articles.len();
    data.articles.retain(|a| a.id != id);
    if data.articles.len() == before {
        return fail("Article not found", "404");
    }
    data.favorites.retain(|(_, article_id)| *article_id != id);
    ok(Value::Null, "Article deleted")
}

fn read_article(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let id = req.path_param("id").unwrap_or_default().to_string();
    match db.lock().article_mut(&id) {
        Some(article) => {
            article.read_count += 1;
            ok(Value::Null, "Read recorded")
        }
        None => fail("Article not found", "404"),
    }
}

fn set_status(db: &MockDb, id: &str, status: i32) -> Option<Article> {
    let mut data = db.lock();
    let article = data.article_mut(id)?;
    article.status = status;
    if status == 1 && article.published_at.is_none() {
        article.published_at = Some(now_iso());
    }
    article.updated_at = Some(now_iso());
    Some(article.clone())
}

fn publish_article(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    match set_status(db, req.path_param("id").unwrap_or_default(), 1) {
        Some(article) => ok(article, "Article published"),
        None => fail("Article not found", "404"),
    }
}

fn offline_article(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    match set_status(db, req.path_param("id").unwrap_or_default(), 2) {
        Some(article) => ok(article, "Article taken offline"),
        None => fail("Article not found", "404"),
    }
}

fn update_article_status(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(status) = req.param_i64("status").filter(|s| (0..=2).contains(s)) else {
        return fail("Status must be 0, 1 or 2", "400");
    };
    match set_status(db, req.path_param("id").unwrap_or_default(), status as i32) {
        Some(article) => ok(article, "Article status updated"),
        None => fail("Article not found", "404"),
    }
}

/// Ids are compared as strings; numeric ids in the request are stringified.
fn batch_delete_articles(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(Value::Array(raw_ids)) = req.params.get("ids") else {
        return fail("Provide the list of article ids to delete", "400");
    };
    let ids: Vec<String> = raw_ids
        .iter()
        .filter_map(|id| match id {
            Value::String(s) => Some(s.clone()),
            other => lenient_i64(other).map(|n| n.to_string()),
        })
        .collect();

    let mut data = db.lock();
    let before = data.articles.len();
    data.articles.retain(|a| !ids.contains(&a.id));
    let deleted = before - data.articles.len();
    data.favorites.retain(|(_, article_id)| !ids.contains(article_id));

    ok(
        json!({ "deletedCount": deleted }),
        &format!("Deleted {} article(s)", deleted),
    )
}

fn article_statistics(db: &MockDb, _req: &MockRequest) -> ApiResponse<Value> {
    let data = db.lock();
    let count = |status: i32| data.articles.iter().filter(|a| a.status == status).count();

    ok(
        json!({
            "totalArticles": data.articles.len(),
            "publishedArticles": count(1),
            "draftArticles": count(0),
            "offlineArticles": count(2),
            "totalViews": data.articles.iter().map(|a| a.read_count).sum::<i64>(),
            "totalFavorites": data.favorites.len(),
        }),
        "Fetched statistics",
    )
}

// --- Favorites ---

fn add_favorite(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(user_id) = db.current_user_id(req) else {
        return fail("Not logged in", "401");
    };
    let article_id = req.path_param("articleId").unwrap_or_default().to_string();

    let mut data = db.lock();
    if data.article(&article_id).is_none() {
        return fail("Article not found", "404");
    }
    if data.is_favorite(user_id, &article_id) {
        return fail("Article already in favorites", "400");
    }

    data.favorites.push((user_id, article_id.clone()));
    if let Some(article) = data.article_mut(&article_id) {
        article.favorite_count += 1;
    }
    ok(Value::Null, "Added to favorites")
}

fn remove_favorite(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(user_id) = db.current_user_id(req) else {
        return fail("Not logged in", "401");
    };
    let article_id = req.path_param("articleId").unwrap_or_default().to_string();

    let mut data = db.lock();
    let Some(index) = data
        .favorites
        .iter()
        .position(|(user, article)| *user == user_id && *article == article_id)
    else {
        return fail("Article is not in favorites", "400");
    };

    data.favorites.remove(index);
    if let Some(article) = data.article_mut(&article_id) {
        article.favorite_count = (article.favorite_count - 1).max(0);
    }
    ok(Value::Null, "Removed from favorites")
}

fn favorite_status(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(user_id) = db.current_user_id(req) else {
        return fail("Not logged in", "401");
    };
    let article_id = req.path_param("articleId").unwrap_or_default();
    ok(db.lock().is_favorite(user_id, article_id), "Fetched favorite status")
}

fn favorite_page(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(user_id) = db.current_user_id(req) else {
        return fail("Not logged in", "401");
    };

    let data = db.lock();
    let mut articles: Vec<Article> = data
        .articles
        .iter()
        .filter(|a| data.is_favorite(user_id, &a.id))
        .cloned()
        .map(|mut a| {
            a.is_favorited = Some(true);
            a
        })
        .collect();

    if let Some(title) = req.param_str("title") {
        articles.retain(|a| a.title.contains(&title));
    }
    if let Some(category_id) = req.param_i64("categoryId") {
        articles.retain(|a| a.category_id == Some(category_id));
    }

    let (current, size) = page_args(req, 10);
    ok(paginate(&articles, current, size), "Query successful")
}

fn favorite_count(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(user_id) = db.current_user_id(req) else {
        return fail("Not logged in", "401");
    };
    let count = db
        .lock()
        .favorites
        .iter()
        .filter(|(user, _)| *user == user_id)
        .count();
    ok(count, "Fetched favorite count")
}
