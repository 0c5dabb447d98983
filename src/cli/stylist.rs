// src/cli/stylist.rs — Interactive stylist REPL

use std::future::Future;
use std::io::{BufRead, Write};
use std::path::Path;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::account::Account;
use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::infra::errors::LumiereError;
use crate::navigation::{Checkout, Navigator, View};
use crate::stylist::{Role, StylistHost, StylistSession};

/// Run the stylist REPL until `/quit`, EOF, or Ctrl-C at the prompt.
pub async fn run_stylist(
    host: &mut StylistHost,
    model: &str,
    product_id: Option<u32>,
) -> anyhow::Result<()> {
    let session = host.enter_with_product_id(product_id).await?;
    eprintln!(
        "lumiere v{} | {} | styling: {} | /help for commands\n",
        env!("CARGO_PKG_VERSION"),
        model,
        session
            .product()
            .map(|p| p.name.as_str())
            .unwrap_or("general advice"),
    );

    let mut shop = Shop {
        cart: Cart::new(),
        nav: Navigator::new(),
        account: Account::demo()?,
    };
    shop.nav.style_product(session.product().map(|p| p.id));
    let mut lines = spawn_line_reader();

    loop {
        let input = match next_input(&mut lines, interrupt).await {
            Input::Line(line) => line,
            Input::Interrupted => {
                eprintln!("\n  Interrupted.");
                break;
            }
            Input::Closed => break,
        };
        let trimmed = input.trim();

        if trimmed == "quit" || trimmed == "exit" || trimmed == "/quit" {
            break;
        }

        if trimmed.starts_with('/') {
            handle_slash_command(trimmed, host, &mut shop).await;
            continue;
        }

        let Some(session) = host.session_mut() else {
            anyhow::bail!("stylist session closed unexpectedly");
        };

        // A bare Enter still sends when an image is waiting
        if trimmed.is_empty() && session.pending().attachment().is_none() {
            continue;
        }

        session.set_text(trimmed);
        match send_turn(session, interrupt).await {
            Ok(()) => {}
            Err(LumiereError::EmptyInput) => {}
            Err(e) if e.is_rejection() => eprintln!("  {}", e),
            Err(e) => eprintln!("[error] {}", e),
        }
    }

    host.leave_stylist();
    if !shop.cart.is_empty() {
        eprintln!(
            "\nCart: {} item(s), total ${:.2}",
            shop.cart.item_count(),
            shop.cart.total()
        );
    }
    Ok(())
}

/// Storefront state that lives beside the stylist for the whole REPL.
struct Shop {
    cart: Cart,
    nav: Navigator,
    account: Account,
}

/// Ctrl-C. Tokio keeps its SIGINT handler installed once the first listener
/// exists, so every prompt and every turn listens for it explicitly.
async fn interrupt() {
    let _ = tokio::signal::ctrl_c().await;
}

enum Input {
    Line(String),
    Interrupted,
    Closed,
}

/// Read stdin on a plain thread so a pending read never blocks the runtime
/// or its shutdown.
fn spawn_line_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn next_input<F, Fut>(lines: &mut mpsc::UnboundedReceiver<String>, interrupt: F) -> Input
where
    F: FnOnce() -> Fut,
    Fut: Future,
{
    print!("> ");
    std::io::stdout().flush().ok();

    tokio::select! {
        line = lines.recv() => match line {
            Some(line) => Input::Line(line),
            None => Input::Closed,
        },
        _ = interrupt() => Input::Interrupted,
    }
}

/// Send the pending input. An interrupt while the reply is outstanding
/// cancels the turn; the session reports it like any other failed turn.
async fn send_turn<F, Fut>(session: &mut StylistSession, mut interrupt: F) -> Result<(), LumiereError>
where
    F: FnMut() -> Fut,
    Fut: Future,
{
    let cancel = CancellationToken::new();
    let turn = session.send_with_cancel(cancel.clone());
    tokio::pin!(turn);

    loop {
        tokio::select! {
            result = &mut turn => return result,
            _ = interrupt(), if !cancel.is_cancelled() => {
                eprintln!("\n  Cancelling reply...");
                cancel.cancel();
            }
        }
    }
}

async fn handle_slash_command(input: &str, host: &mut StylistHost, shop: &mut Shop) {
    let cart = &mut shop.cart;
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/attach" => {
            if arg.is_empty() {
                eprintln!("  Usage: /attach <image path>");
                return;
            }
            if let Some(session) = host.session_mut() {
                // Rejections are surfaced by the session as a notice
                if session.select_path(Path::new(arg)).is_ok() {
                    eprintln!("  Attached {}. Type a message or press Enter to send.", arg);
                }
            }
        }

        "/detach" => {
            if let Some(session) = host.session_mut() {
                session.clear_attachment();
                eprintln!("  Attachment cleared.");
            }
        }

        "/product" => {
            let product_id = match arg {
                "" => {
                    let current = host
                        .session()
                        .and_then(|s| s.product())
                        .map(|p| format!("{} ({})", p.name, p.id))
                        .unwrap_or_else(|| "none".into());
                    eprintln!("  Styling: {}", current);
                    eprintln!("  Usage: /product <id>|none");
                    return;
                }
                "none" => None,
                id => match id.parse::<u32>() {
                    Ok(id) => Some(id),
                    Err(_) => {
                        eprintln!("  Invalid product id: {}", id);
                        return;
                    }
                },
            };
            match host.enter_with_product_id(product_id).await {
                Ok(_) => {
                    shop.nav.style_product(product_id);
                }
                Err(e) => eprintln!("  {}", e),
            }
        }

        "/profile" => {
            let styling = shop.nav.styling();
            if shop.nav.navigate(View::Profile) == &View::SignIn {
                eprintln!("  Please sign in first (/signin).");
            } else {
                print_profile(&shop.account, host.catalog());
            }
            shop.nav.style_product(styling);
        }

        "/signin" => {
            let styling = shop.nav.styling();
            if shop.nav.is_authenticated() {
                eprintln!("  Already signed in as {}.", shop.account.user.name);
            } else {
                shop.nav.sign_in();
                eprintln!("  Signed in as {}.", shop.account.user.name);
            }
            shop.nav.style_product(styling);
        }

        "/signout" => {
            let styling = shop.nav.styling();
            shop.nav.sign_out();
            eprintln!("  Signed out.");
            shop.nav.style_product(styling);
        }

        "/checkout" => {
            let styling = shop.nav.styling();
            if cart.is_empty() {
                eprintln!("  Your cart is empty.");
                return;
            }
            match shop.nav.checkout() {
                Checkout::SignInRequired => eprintln!("  Please sign in to check out (/signin)."),
                Checkout::Unavailable => eprintln!("  Checkout is coming soon."),
            }
            shop.nav.style_product(styling);
        }

        "/add" => {
            let mut args = arg.split_whitespace();
            let Some(id) = args.next().and_then(|s| s.parse::<u32>().ok()) else {
                eprintln!("  Usage: /add <id> [size] [color]");
                return;
            };
            match host.catalog().get(id) {
                Ok(product) => {
                    let key = cart.add(product, args.next(), args.next(), 1);
                    eprintln!(
                        "  Added {} ({}, {}). Cart: {} item(s).",
                        product.name,
                        key.size,
                        key.color,
                        cart.item_count()
                    );
                }
                Err(e) => eprintln!("  {}", e),
            }
        }

        "/cart" => {
            if cart.is_empty() {
                eprintln!("  Your cart is empty.");
            } else {
                for line in cart.lines() {
                    eprintln!(
                        "  {} x{} ({}, {})  ${:.2}",
                        line.name,
                        line.quantity,
                        line.key.size,
                        line.key.color,
                        line.line_total()
                    );
                }
                let shipping = cart.shipping();
                eprintln!("  Subtotal: ${:.2}", cart.subtotal());
                if shipping == 0.0 {
                    eprintln!("  Shipping: free");
                } else {
                    eprintln!("  Shipping: ${:.2}", shipping);
                }
                eprintln!("  Total:    ${:.2}", cart.total());
            }
        }

        "/transcript" => {
            let Some(session) = host.session() else {
                return;
            };
            for message in session.transcript().messages() {
                let who = match message.role {
                    Role::User => "you",
                    Role::Assistant => "stylist",
                };
                let image = if message.image.is_some() { " [image]" } else { "" };
                eprintln!("  {} {}:{} {}", message.id, who, image, message.text);
            }
        }

        "/help" => {
            eprintln!("Slash commands:");
            eprintln!("  /attach <path>       Attach an image to the next message");
            eprintln!("  /detach              Remove the pending image");
            eprintln!("  /product <id>|none   Switch the product being styled (new session)");
            eprintln!("  /add <id> [size] [color]  Add a product to the cart");
            eprintln!("  /cart                Show cart totals");
            eprintln!("  /checkout            Check out (requires sign-in)");
            eprintln!("  /signin, /signout    Demo sign-in");
            eprintln!("  /profile             Show profile and orders (requires sign-in)");
            eprintln!("  /transcript          Show the conversation so far");
            eprintln!("  /help                Show this help");
            eprintln!("  /quit, quit, exit    End session");
            eprintln!("Ctrl-C cancels a reply in progress; at the prompt it ends the session.");
        }

        _ => {
            eprintln!("Unknown command: {}. Type /help for commands.", cmd);
        }
    }
}

fn print_profile(account: &Account, catalog: &Catalog) {
    let user = &account.user;
    eprintln!("  {} <{}>", user.name, user.email);
    eprintln!("  {}", user.phone);
    eprintln!("  Ships to: {}", user.default_address);
    eprintln!("  Orders:");
    for order in &account.orders {
        eprintln!(
            "    {}  {}  {:<10}  ${:.2}  {}",
            order.id,
            order.date,
            order.status,
            order.total,
            Account::item_names(order, catalog).join(", ")
        );
    }
}
