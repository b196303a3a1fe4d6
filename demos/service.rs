use std::sync::Arc;
use user_store::{Config, Error, UserInput, UserService, UserStore};

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt().with_target(false).compact().init();

    let path = std::env::temp_dir().join("user_store_example_service").join("users.json");
    let _ = std::fs::remove_file(&path);
    let config = Config::builder().data_path(&path).build();
    let service = UserService::new(Arc::new(UserStore::from_config(&config)?))?;

    let ada = service.create_user(UserInput::new("Ada", "ada@x.com"))?;
    let ada = service.update_user(&ada.id, UserInput::new("Ada Lovelace", "ada@x.com"))?;
    println!("{}", serde_json::to_string_pretty(&ada).unwrap_or_default());

    // invalid input and conflicts come back as typed errors
    let _ = service.create_user(UserInput::new("", "nobody@x.com"));
    let _ = service.create_user(UserInput::new("Eve", "ada@x.com"));

    service.delete_user(&ada.id)?;
    println!("left: {}", service.list_users().len());
    print!("{}", service.metrics().encode()?);
    Ok(())
}
