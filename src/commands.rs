use std::path::PathBuf;

use anyhow::bail;
use chrono::{DateTime, FixedOffset, Utc};

use devthoughts::config::{AvatarAction, Command, SettingsAction, SettingsArgs};
use devthoughts::models::{NewPost, Post, SettingsUpdate, SettingsUserUpdate, SignupRequest};
use devthoughts::screens::{CommentsScreen, Mounted, SearchScreen, SettingsScreen, UserPanel};
use devthoughts::session::Route;
use devthoughts::view::{Pager, RequestState};
use devthoughts::ApiClient;

pub async fn run(client: &ApiClient, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Signup {
            username,
            email,
            password,
            password2,
            sex,
        } => {
            let req = SignupRequest {
                username,
                email,
                password2: password2.unwrap_or_else(|| password.clone()),
                password,
                sex,
            };
            let resp = client.signup(&req).await?;
            println!(
                "{}",
                resp.message
                    .unwrap_or_else(|| format!("Account {} created", resp.username))
            );
            println!("Log in with: devthoughts login {}", resp.username);
        }
        Command::Login { username, password } => {
            let resp = client.login(&username, &password).await?;
            let name = resp.username.unwrap_or(username);
            println!("Logged in as {}", name);
        }
        Command::Logout => {
            client.logout()?;
            println!("Logged out");
        }
        Command::Whoami => {
            let session = client.session().snapshot()?;
            match (session.token, session.username) {
                (Some(_), Some(name)) => println!("{}", name),
                (Some(_), None) => println!("Logged in (username unknown)"),
                (None, _) => println!("Not logged in"),
            }
        }
        Command::Feed { page, search } => {
            let page_size = client.pagination().feed_page_size;
            let result = client.list_posts(page, page_size, search.as_deref()).await?;
            let mut pager = Pager::new(page_size);
            pager.page = page;
            pager.observe(&result);
            if result.items.is_empty() {
                println!("No posts yet");
            }
            for post in &result.items {
                print_post(post, "");
            }
            print_pager(&pager);
        }
        Command::Post { text, media } => {
            let post = NewPost::text(text).with_media(media);
            client.create_post(&post).await?;
            println!("Posted");
        }
        Command::Show { post_id, page } => {
            let Some(mut screen) = mounted(CommentsScreen::mount(client.clone(), &post_id).await?)?
            else {
                return Ok(());
            };
            if page > 1 {
                screen.go_to_page(page).await;
            }
            let post = state_value(&screen.post)?;
            print_post(post, "");
            match &screen.comments {
                RequestState::Success(list) if list.is_empty() => println!("  No comments"),
                RequestState::Success(list) => {
                    for comment in &list.posts {
                        print_post(comment, "  ");
                    }
                    print_pager(&screen.pager);
                }
                RequestState::Error(message) => eprintln!("  Failed to load comments: {}", message),
                _ => {}
            }
        }
        Command::Delete { post_id } => {
            client.delete_post(&post_id).await?;
            println!("Deleted {}", post_id);
        }
        Command::Like { post_id } => {
            client.like(&post_id).await?;
            println!("Liked {}", post_id);
        }
        Command::Unlike { post_id } => {
            client.unlike(&post_id).await?;
            println!("Unliked {}", post_id);
        }
        Command::Comment { post_id, text } => {
            client.comment(&post_id, &text).await?;
            println!("Commented on {}", post_id);
        }
        Command::User { username, page } => {
            let Some(mut panel) =
                mounted(UserPanel::mount(client.clone(), username.as_deref()).await?)?
            else {
                return Ok(());
            };
            if page > 1 {
                panel.go_to_page(page).await;
            }
            print_user_panel(&panel);
        }
        Command::Settings { action } => match action {
            SettingsAction::Show { username } => {
                let Some(screen) =
                    mounted(SettingsScreen::mount(client.clone(), username.as_deref()).await?)?
                else {
                    return Ok(());
                };
                print_settings(&screen)?;
            }
            SettingsAction::Update(args) => {
                let Some(mut screen) = mounted(SettingsScreen::mount(client.clone(), None).await?)?
                else {
                    return Ok(());
                };
                screen.save(&settings_update(args)).await?;
                println!("Settings saved");
                print_settings(&screen)?;
            }
        },
        Command::Search { query, page } => {
            let mut screen = SearchScreen::new(client.clone());
            screen.search(&query).await;
            if page > 1 {
                screen.go_to_page(page).await;
            }
            let results = state_value(&screen.results)?;
            println!("{} result(s) for \"{}\"", results.total, screen.query);
            for post in &results.results {
                print_post(post, "");
                for fragment in post.highlight.values().flatten() {
                    println!("    ... {}", fragment);
                }
            }
            println!("Page {} of {}", screen.page, screen.total_pages());
        }
        Command::Avatar { action } => avatar(client, action).await?,
    }
    Ok(())
}

async fn avatar(client: &ApiClient, action: AvatarAction) -> anyhow::Result<()> {
    match action {
        AvatarAction::Get { user, output } => {
            let own = client.session().username()?;
            let target = user.or(own);
            let picture = match target.as_deref() {
                Some(name) => client.profile_picture_for(name).await?,
                None => client.profile_picture(None).await?,
            };
            let Some(picture) = picture else {
                println!("No profile picture");
                return Ok(());
            };
            let stem = target.unwrap_or_else(|| "profile".to_string());
            let path = output.unwrap_or_else(|| PathBuf::from("."));
            let written = picture.save(&path, &stem).await?;
            println!(
                "Saved {} ({} bytes) to {}",
                picture.content_type,
                picture.bytes.len(),
                written.display()
            );
        }
        AvatarAction::Set { file } => {
            client.upload_profile_picture(&file).await?;
            println!("Profile picture uploaded");
        }
        AvatarAction::Replace { file } => {
            client.replace_profile_picture(&file).await?;
            println!("Profile picture replaced");
        }
        AvatarAction::Delete => {
            client.delete_profile_picture().await?;
            println!("Profile picture removed");
        }
    }
    Ok(())
}

/// Unwrap a mounted screen, telling the user what to do when it redirected.
fn mounted<S>(mounted: Mounted<S>) -> anyhow::Result<Option<S>> {
    match mounted {
        Mounted::Ready(screen) => Ok(Some(screen)),
        Mounted::Redirect(Route::Login) => bail!("Not logged in. Run `devthoughts login <username>` first"),
        Mounted::Redirect(route) => {
            println!("Redirected to {}", route);
            Ok(None)
        }
    }
}

fn state_value<T>(state: &RequestState<T>) -> anyhow::Result<&T> {
    match state {
        RequestState::Success(value) => Ok(value),
        RequestState::Error(message) => bail!("{}", message),
        RequestState::Idle | RequestState::Loading => bail!("Nothing loaded"),
    }
}

fn settings_update(args: SettingsArgs) -> SettingsUpdate {
    let user = SettingsUserUpdate {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
    };
    SettingsUpdate {
        user: (!user.is_empty()).then_some(user),
        sex: args.sex,
        timezone: args.timezone,
        show_email: args.show_email,
        profile_visibility: args.visibility,
    }
}

fn print_post(post: &Post, indent: &str) {
    let author = post.username.as_deref().unwrap_or("unknown");
    let age = post
        .created_at()
        .map(|at| format!(" · {}", relative_age(at, Utc::now())))
        .unwrap_or_default();
    println!("{}[{}] {}{}", indent, post.id, author, age);
    println!("{}  {}", indent, post.content.text);
    for media in &post.content.media {
        println!("{}  <{}>", indent, media);
    }
    let heart = if post.is_liked { "♥" } else { "♡" };
    println!(
        "{}  {} {}  💬 {}",
        indent,
        heart,
        post.like_count,
        post.comment_count()
    );
}

fn print_pager(pager: &Pager) {
    if pager.total_pages > 1 {
        println!("Page {} of {}", pager.page, pager.total_pages);
    }
}

fn print_user_panel(panel: &UserPanel) {
    match &panel.user {
        RequestState::Success(user) => {
            println!("{} (@{})", user.display_name(), user.username);
            if !user.email.is_empty() {
                println!("  {}", user.email);
            }
            if let Some(joined) = &user.date_joined {
                println!("  Joined {}", joined);
            }
        }
        RequestState::Error(message) => eprintln!("Failed to load user: {}", message),
        _ => {}
    }

    if let RequestState::Success(settings) = &panel.settings {
        println!(
            "  Visibility: {:?}, timezone {}",
            settings.profile_visibility, settings.timezone
        );
    }

    match &panel.picture {
        Some(picture) => println!("  Profile picture: {} bytes ({})", picture.bytes.len(), picture.content_type),
        None => println!("  No profile picture"),
    }
    println!();

    match &panel.posts {
        RequestState::Success(list) if list.is_empty() => println!("No posts yet"),
        RequestState::Success(list) => {
            for post in &list.posts {
                print_post(post, "");
            }
            print_pager(&panel.pager);
        }
        RequestState::Error(message) => eprintln!("Failed to load posts: {}", message),
        _ => {}
    }
}

fn print_settings(screen: &SettingsScreen) -> anyhow::Result<()> {
    let settings = state_value(&screen.settings)?;
    println!("Settings for {}", screen.username);
    println!("  First name:  {}", settings.user.first_name);
    println!("  Last name:   {}", settings.user.last_name);
    println!("  Email:       {}", settings.user.email);
    println!("  Sex:         {}", settings.sex.as_deref().unwrap_or("-"));
    println!("  Timezone:    {}", settings.timezone);
    println!("  Show email:  {}", settings.show_email);
    println!("  Visibility:  {:?}", settings.profile_visibility);
    Ok(())
}

/// Short age like "5m ago"; future timestamps read as "just now".
fn relative_age(at: DateTime<FixedOffset>, now: DateTime<Utc>) -> String {
    let secs = (now - at.with_timezone(&Utc)).num_seconds();
    match secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3600),
        s if s < 30 * 86_400 => format!("{}d ago", s / 86_400),
        _ => at.format("%Y-%m-%d").to_string(),
    }
}
