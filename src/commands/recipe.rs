use clap::{Args, Subcommand, ValueEnum};

use crate::config::Config;
use crate::db::RecipeRepository;
use crate::models::{Ingredient, Recipe};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct RecipeCommand {
    #[command(subcommand)]
    pub command: RecipeSubcommand,
}

#[derive(Subcommand)]
pub enum RecipeSubcommand {
    /// Add a new recipe
    Add {
        /// Recipe title
        title: String,

        /// Ingredient as NAME:AMOUNT:UNIT (can be repeated)
        #[arg(long = "ingredient", value_name = "NAME:AMOUNT:UNIT")]
        ingredients: Vec<String>,

        /// Category (e.g. breakfast, dinner)
        #[arg(long)]
        category: Option<String>,

        /// Tag (can be repeated)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Main image URL
        #[arg(long)]
        image: Option<String>,

        /// Gallery image URL (can be repeated)
        #[arg(long = "gallery", value_name = "URL")]
        gallery: Vec<String>,
    },

    /// List all recipes
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a recipe by id or title
    Show {
        recipe: String,
    },

    /// Search recipes by title, category or tag
    Search {
        query: String,
    },

    /// Remove a recipe by id or title
    Remove {
        recipe: String,
    },
}

impl RecipeCommand {
    pub async fn run(
        &self,
        repo: &RecipeRepository,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            RecipeSubcommand::Add {
                title,
                ingredients,
                category,
                tags,
                image,
                gallery,
            } => {
                let mut parsed = Vec::with_capacity(ingredients.len());
                for spec in ingredients {
                    parsed.push(parse_ingredient(spec)?);
                }

                let mut recipe = Recipe::new(title, &config.user_name)
                    .with_ingredients(parsed)
                    .with_tags(tags.clone())
                    .with_gallery_urls(gallery.clone());
                if let Some(category) = category {
                    recipe = recipe.with_category(category);
                }
                if let Some(image) = image {
                    recipe = recipe.with_image_url(image);
                }

                let created = repo.create(&recipe).await?;
                println!("Created recipe #{}:", created.id);
                println!("{}", created);
                Ok(())
            }

            RecipeSubcommand::List { format } => {
                let recipes = repo.list().await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&recipes)?);
                    }
                    OutputFormat::Text => {
                        if recipes.is_empty() {
                            println!("No recipes yet.");
                        }
                        for recipe in recipes {
                            match &recipe.category {
                                Some(category) => {
                                    println!("#{:<4} {} ({})", recipe.id, recipe.title, category)
                                }
                                None => println!("#{:<4} {}", recipe.id, recipe.title),
                            }
                        }
                    }
                }
                Ok(())
            }

            RecipeSubcommand::Show { recipe } => {
                match resolve_recipe(repo, recipe).await? {
                    Some(found) => {
                        println!("{}", found);
                        Ok(())
                    }
                    None => Err(format!("Recipe not found: {}", recipe).into()),
                }
            }

            RecipeSubcommand::Search { query } => {
                let recipes = repo.search(query).await?;
                if recipes.is_empty() {
                    println!("No recipes match '{}'.", query);
                }
                for recipe in recipes {
                    println!("#{:<4} {}", recipe.id, recipe.title);
                }
                Ok(())
            }

            RecipeSubcommand::Remove { recipe } => {
                match resolve_recipe(repo, recipe).await? {
                    Some(found) => {
                        repo.delete(found.id).await?;
                        println!("Removed recipe '{}'.", found.title);
                        Ok(())
                    }
                    None => Err(format!("Recipe not found: {}", recipe).into()),
                }
            }
        }
    }
}

/// Resolves a recipe reference: a numeric id, or a title.
pub(crate) async fn resolve_recipe(
    repo: &RecipeRepository,
    reference: &str,
) -> Result<Option<Recipe>, sqlx::Error> {
    if let Ok(id) = reference.parse::<i64>() {
        repo.get_by_id(id).await
    } else {
        repo.get_by_title(reference).await
    }
}

/// Parses NAME:AMOUNT:UNIT (unit may be empty: "eggs:3:").
fn parse_ingredient(spec: &str) -> Result<Ingredient, String> {
    let parts: Vec<&str> = spec.splitn(3, ':').collect();
    if parts.len() < 2 {
        return Err(format!(
            "Invalid ingredient '{}'. Use NAME:AMOUNT or NAME:AMOUNT:UNIT.",
            spec
        ));
    }
    let amount: f64 = parts[1]
        .parse()
        .map_err(|_| format!("Invalid amount in ingredient '{}'.", spec))?;
    let unit = parts.get(2).copied().unwrap_or("");
    Ok(Ingredient::new(parts[0], amount, unit))
}
