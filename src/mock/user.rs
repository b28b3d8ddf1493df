use serde_json::{Value, json};

use super::{
    MockDb, MockRegistry, MockRequest, bind, fail, ok, paginate,
    store::{ADMIN_USER_ID, now_iso},
};
use crate::{api::HttpMethod, models::ApiResponse, models::UserInfo};

pub fn register(registry: &mut MockRegistry, db: &MockDb) {
    bind(registry, db, HttpMethod::Post, "/user/login", login);
    bind(registry, db, HttpMethod::Post, "/user/add", add_user);
    bind(registry, db, HttpMethod::Get, "/user/current", current_user);
    bind(registry, db, HttpMethod::Get, "/user/forget", forget_password);
    bind(registry, db, HttpMethod::Post, "/user/logout", logout);
    bind(registry, db, HttpMethod::Get, "/user/page", user_page);
    bind(registry, db, HttpMethod::Get, "/user/statistics", statistics);
    bind(registry, db, HttpMethod::Get, "/user/:id", get_user);
    bind(registry, db, HttpMethod::Put, "/user/:id", update_user);
    bind(registry, db, HttpMethod::Put, "/user/password/:id", change_password);
    bind(registry, db, HttpMethod::Put, "/user/:id/status", update_status);
    bind(registry, db, HttpMethod::Delete, "/user/:id", delete_user);
}

/// login
///
/// Any seeded account with its current password. The response carries the full user
/// (including `roleCode`) and a signed session token.
fn login(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let (Some(username), Some(password)) = (req.param_str("username"), req.param_str("password"))
    else {
        return fail("Username and password are required", "400");
    };

    let data = db.lock();
    let Some(user) = data.users.iter().find(|u| u.username == username) else {
        return fail(
            "Unknown username. Test accounts: admin/123456 or user001/123456",
            "400",
        );
    };

    if data.passwords.get(&user.id).map(String::as_str) != Some(password.as_str()) {
        return fail("Wrong password. Test password: 123456", "400");
    }

    if user.status == Some(0) {
        return fail("This account has been disabled", "403");
    }

    let role = user.role_code.clone().unwrap_or_else(|| "USER".to_string());
    let Some(token) = db.tokens().issue(user.id, &user.username, &role) else {
        return fail("Failed to issue session token", "500");
    };

    let mut session_user = user.clone();
    session_user.token = Some(token);
    tracing::info!("Mock login for {} ({})", session_user.username, role);
    ok(session_user, "Login successful")
}

fn add_user(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let (Some(username), Some(password), Some(email)) = (
        req.param_str("username"),
        req.param_str("password"),
        req.param_str("email"),
    ) else {
        return fail("Username, password and email are required", "400");
    };

    if let Some(confirm) = req.param_str("confirmPassword") {
        if password.trim() != confirm.trim() {
            return fail("The two passwords do not match", "400");
        }
    }

    let mut data = db.lock();
    if data.users.iter().any(|u| u.username == username) {
        return fail("Username already exists", "400");
    }
    if data.users.iter().any(|u| u.email.as_deref() == Some(email.as_str())) {
        return fail("Email is already registered", "400");
    }

    let id = data.next_user_id;
    data.next_user_id += 1;

    let user_type = req.param_i64("userType").unwrap_or(1) as i32;
    let nickname = req.param_str("nickname").unwrap_or_else(|| username.clone());
    let now = now_iso();
    let user = UserInfo {
        id,
        username,
        name: Some(nickname.clone()),
        nickname: Some(nickname),
        email: Some(email),
        phone: req.param_str("phone"),
        gender: req.param_i64("gender").map(|g| g as i32),
        birthday: req.param_str("birthday"),
        avatar: Some("/img/avatar/default.jpg".to_string()),
        role_code: Some(if user_type == 2 { "ADMIN" } else { "USER" }.to_string()),
        user_type: Some(user_type),
        status: Some(1),
        token: None,
        menu_list: None,
        created_at: Some(now.clone()),
        updated_at: Some(now),
    };

    data.passwords.insert(id, password.trim().to_string());
    data.users.push(user.clone());
    ok(user, "Registration successful")
}

fn current_user(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(user_id) = db.current_user_id(req) else {
        return fail("Not logged in", "401");
    };

    match db.lock().user(user_id) {
        Some(user) => ok(user, "Fetched current user"),
        None => fail("User not found", "404"),
    }
}

fn get_user(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(id) = req.path_i64("id") else {
        return fail("Invalid user id", "400");
    };

    match db.lock().user(id) {
        Some(user) => ok(user, "Fetched user"),
        None => fail("User not found", "404"),
    }
}

fn update_user(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(id) = req.path_i64("id") else {
        return fail("Invalid user id", "400");
    };

    let mut data = db.lock();
    let Some(user) = data.user_mut(id) else {
        return fail("User not found", "404");
    };

    if let Some(nickname) = req.param_str("nickname") {
        user.nickname = Some(nickname);
    }
    if let Some(email) = req.param_str("email") {
        user.email = Some(email);
    }
    if let Some(phone) = req.param_str("phone") {
        user.phone = Some(phone);
    }
    if let Some(gender) = req.param_i64("gender") {
        user.gender = Some(gender as i32);
    }
    if let Some(birthday) = req.param_str("birthday") {
        user.birthday = Some(birthday);
    }
    if let Some(avatar) = req.param_str("avatar") {
        user.avatar = Some(avatar);
    }
    user.updated_at = Some(now_iso());

    ok(user.clone(), "Profile updated")
}

fn change_password(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let (Some(old_password), Some(new_password)) =
        (req.param_str("oldPassword"), req.param_str("newPassword"))
    else {
        return fail("Old and new password are required", "400");
    };
    let Some(id) = req.path_i64("id") else {
        return fail("Invalid user id", "400");
    };

    let mut data = db.lock();
    if data.user(id).is_none() {
        return fail("User not found", "404");
    }
    if data.passwords.get(&id) != Some(&old_password) {
        return fail("Old password is incorrect", "400");
    }

    data.passwords.insert(id, new_password);
    ok(Value::Null, "Password changed")
}

fn forget_password(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let (Some(email), Some(new_password)) = (req.param_str("email"), req.param_str("newPassword"))
    else {
        return fail("Email and new password are required", "400");
    };

    let mut data = db.lock();
    let Some(id) = data
        .users
        .iter()
        .find(|u| u.email.as_deref() == Some(email.as_str()))
        .map(|u| u.id)
    else {
        return fail("Email not found", "404");
    };

    data.passwords.insert(id, new_password);
    ok(Value::Null, "Password reset")
}

fn logout(_db: &MockDb, _req: &MockRequest) -> ApiResponse<Value> {
    ok(Value::Null, "Logged out")
}

fn user_page(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let contains = |haystack: &Option<String>, needle: &str| {
        haystack
            .as_deref()
            .is_some_and(|value| value.to_lowercase().contains(&needle.to_lowercase()))
    };

    let data = db.lock();
    let mut users: Vec<&UserInfo> = data.users.iter().collect();

    if let Some(username) = req.param_str("username") {
        users.retain(|u| contains(&Some(u.username.clone()), &username));
    }
    if let Some(email) = req.param_str("email") {
        users.retain(|u| contains(&u.email, &email));
    }
    if let Some(nickname) = req.param_str("nickname") {
        users.retain(|u| contains(&u.nickname, &nickname));
    }
    if let Some(phone) = req.param_str("phone") {
        users.retain(|u| contains(&u.phone, &phone));
    }
    if let Some(user_type) = req.param_i64("userType") {
        users.retain(|u| u.user_type == Some(user_type as i32));
    }
    if let Some(status) = req.param_i64("status") {
        users.retain(|u| u.status == Some(status as i32));
    }

    let current = req.param_i64("currentPage").unwrap_or(1).max(1) as u64;
    let size = req.param_i64("size").unwrap_or(10).max(1) as u64;
    let records: Vec<UserInfo> = users.into_iter().cloned().collect();
    ok(paginate(&records, current, size), "Query successful")
}

fn statistics(db: &MockDb, _req: &MockRequest) -> ApiResponse<Value> {
    let data = db.lock();
    let total = data.users.len();
    let active = data.users.iter().filter(|u| u.status == Some(1)).count();

    ok(
        json!({
            "totalUsers": total,
            "activeUsers": active,
            "newUsers": data.users.iter().filter(|u| u.id > 4).count(),
            "riskUsers": 0,
            "totalGrowth": 5.2,
            "activeGrowth": 3.8,
            "newGrowth": 12.3,
        }),
        "Fetched statistics",
    )
}

fn update_status(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(id) = req.path_i64("id") else {
        return fail("Invalid user id", "400");
    };
    let Some(status) = req.param_i64("status") else {
        return fail("Status is required", "400");
    };
    if status != 0 && status != 1 {
        return fail("Invalid user status", "400");
    }
    if id == ADMIN_USER_ID && status == 0 {
        return fail("The administrator account cannot be disabled", "400");
    }

    let mut data = db.lock();
    match data.user_mut(id) {
        Some(user) => {
            user.status = Some(status as i32);
            ok(Value::Null, "User status updated")
        }
        None => fail("User not found", "404"),
    }
}

fn delete_user(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(id) = req.path_i64("id") else {
        return fail("Invalid user id", "400");
    };
    if id == ADMIN_USER_ID {
        return fail("The administrator account cannot be deleted", "400");
    }

    let mut data = db.lock();
    let before = data.users.len();
    data.users.retain(|u| u.id != id);
    if data.users.len() == before {
        return fail("User not found", "404");
    }

    data.passwords.remove(&id);
    data.favorites.retain(|(user_id, _)| *user_id != id);
    ok(Value::Null, "User deleted")
}
