//! Store example with keyed todo state

use satchel::Store;

#[derive(Clone, Debug, PartialEq)]
struct TodoItem {
    id: usize,
    text: String,
    completed: bool,
}

#[derive(Clone, Debug, PartialEq)]
enum AppValue {
    Todos(Vec<TodoItem>),
    Filter(String),
}

fn active_count(value: &AppValue) -> usize {
    match value {
        AppValue::Todos(todos) => todos.iter().filter(|t| !t.completed).count(),
        AppValue::Filter(_) => 0,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Store Example ===\n");

    // Create a store with one key per slice of state
    let store = Store::builder()
        .value("todos", AppValue::Todos(vec![]))
        .value("filter", AppValue::Filter("all".to_string()))
        .build()
        .expect("keys are unique");

    // Subscribe to todo changes only
    let _sub = store
        .subscribe(&["todos"], |todos| {
            println!("Todos updated! Active todos: {}", active_count(todos));
        })
        .expect("todos is a store key");

    let todos = store.action(&"todos").expect("todos is a store key");

    // Add a todo
    println!("Adding todo...");
    todos.update(|value| match value {
        AppValue::Todos(items) => {
            let mut items = items.clone();
            items.push(TodoItem {
                id: 1,
                text: "Learn Satchel".to_string(),
                completed: false,
            });
            AppValue::Todos(items)
        }
        other => other.clone(),
    });

    // Changing the filter does not notify the todo subscriber
    println!("\nChanging filter...");
    store
        .set(&"filter", AppValue::Filter("active".to_string()))
        .expect("filter is a store key");

    // Complete the todo
    println!("\nCompleting todo...");
    todos.update(|value| match value {
        AppValue::Todos(items) => AppValue::Todos(
            items
                .iter()
                .cloned()
                .map(|todo| TodoItem {
                    completed: true,
                    ..todo
                })
                .collect(),
        ),
        other => other.clone(),
    });

    // Read final state
    println!("\nFinal state: {:#?}", store.get_state());

    // Back to the beginning
    store.reset(&[]).expect("reset all keys");
    println!("\nAfter reset: {:#?}", store.get_state());
}
