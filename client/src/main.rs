use clap::Parser;
use client::network::Client;
use client::trajectory_data;
use log::{info, warn};
use shared::ProjectileParams;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:5000")]
    server: String,

    /// Username for authentication
    #[arg(short, long, default_value = "admin")]
    user: String,

    /// Password for authentication
    #[arg(short = 'P', long, default_value = "password123")]
    password: String,

    /// Launch speed in m/s
    #[arg(long, default_value = "100")]
    speed: f64,

    /// Launch angle in degrees
    #[arg(long, default_value = "45")]
    angle: f64,

    /// Projectile mass in kg
    #[arg(long, default_value = "5")]
    mass: f64,

    /// Drag coefficient
    #[arg(long, default_value = "0.47")]
    drag: f64,

    /// Request the server's command reference instead of a simulation
    #[arg(long)]
    commands: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut client = Client::new(&args.server);
    client.connect().await?;
    info!("Connected to {}", args.server);

    let reply = client.authenticate(&args.user, &args.password).await?;
    if !client.is_authenticated() {
        warn!("Authentication refused: {}", reply);
        client.disconnect().await;
        return Err(reply.into());
    }
    info!("Authenticated as {}", args.user);

    let report = if args.commands {
        client.send_help().await?
    } else {
        let params = ProjectileParams::new(args.speed, args.angle, args.mass, args.drag);
        client.send_simulation(&params).await?
    };
    println!("{report}");

    if let Some(data) = trajectory_data::parse(&report) {
        if let Some(summary) = data.summary {
            info!(
                "Range {:.2} m, max height {:.2} m, flight time {:.2} s ({} points)",
                summary.max_range,
                summary.max_height,
                summary.flight_time,
                data.points.len()
            );
        }
    }

    client.disconnect().await;
    Ok(())
}
