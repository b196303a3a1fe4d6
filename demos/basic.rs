use chrono::Utc;
use user_store::{Error, User, UserStore};

fn main() -> Result<(), Error> {
    let path = std::env::temp_dir().join("user_store_example_basic.json");
    let _ = std::fs::remove_file(&path);
    let store = UserStore::open(&path)?;

    // create / get
    store.create(User::new("a", "Ada", "ada@x.com", Utc::now()))?;
    store.create(User::new("b", "Bob", "bob@x.com", Utc::now()))?;
    println!("a = {:?}", store.get("a")?);

    // emails are unique
    match store.create(User::new("c", "Eve", "ada@x.com", Utc::now())) {
        Err(err) => println!("rejected: {err} ({})", err.status_code()),
        Ok(()) => println!("unexpectedly accepted"),
    }

    // update keeps created_at because we copy it forward
    let mut ada = store.get("a")?;
    ada.name = "Ada Lovelace".into();
    ada.updated_at = Utc::now();
    store.update(ada)?;

    // delete
    store.delete("b")?;
    println!("users = {:?}", store.list());
    println!("snapshot:\n{}", std::fs::read_to_string(store.path()).unwrap_or_default());

    let _ = std::fs::remove_file(&path);
    Ok(())
}
